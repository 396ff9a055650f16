pub mod assignment;
pub mod entity;
pub mod event;
pub mod grade;
pub mod memory;
pub mod mongo;
pub mod notification;
pub mod projection;
pub mod repo;
pub mod semester;
pub mod settings;
pub mod store;
pub mod subject;
pub mod teacher;
pub mod timetable;
pub mod user;
