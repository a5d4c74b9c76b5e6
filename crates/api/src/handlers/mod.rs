pub mod document;
pub mod files;
pub mod notification;
pub mod webhook;
