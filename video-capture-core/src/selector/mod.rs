pub mod device_selector;
