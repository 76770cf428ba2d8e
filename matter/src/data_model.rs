pub mod access_control;
pub mod door_lock;
