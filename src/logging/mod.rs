pub mod native_log;
