#![allow(dead_code)]

use std::sync::Arc;

use ts_core::{NewThread, SegmentInput, Thread, UserId};
use ts_db_memory::MemoryStore;
use ts_services::{ServiceConfig, Services};

pub fn alice() -> UserId {
    UserId::from("alice")
}

pub fn bob() -> UserId {
    UserId::from("bob")
}

pub fn carol() -> UserId {
    UserId::from("carol")
}

pub fn memory_services() -> Services {
    memory_services_with(ServiceConfig::default())
}

pub fn memory_services_with(config: ServiceConfig) -> Services {
    let store = Arc::new(MemoryStore::new());
    Services::new(store.clone(), store, config)
}

pub fn focus() -> NewThread {
    NewThread {
        title: "Focus".to_string(),
        segments: vec![
            SegmentInput::new("Do one thing."),
            SegmentInput::new("Then rest."),
        ],
        tags: vec!["Productivity".to_string()],
    }
}

pub async fn published_focus(services: &Services) -> Thread {
    let thread = services.threads.create(&alice(), focus()).await.expect("create");
    services.threads.publish(thread.id, &alice()).await.expect("publish")
}
