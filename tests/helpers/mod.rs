pub mod call_tracker;
