pub mod branch;
pub mod group;
pub mod group_member;
pub mod message;
pub mod user;
