pub mod recording;

#[allow(unused_imports)]
pub use recording::{Call, RecordingCache};

#[allow(dead_code)]
pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
