#![allow(dead_code)]

pub use sysmaint_test_utils::{
    collect_until_completed, init_tracing, output_lines, progress_values, with_timeout,
};

use sysmaint::engine::TaskEvent;

/// True if some output line contains `needle`, with the given error flag.
pub fn has_line(events: &[TaskEvent], needle: &str, is_error: bool) -> bool {
    output_lines(events)
        .iter()
        .any(|(text, err)| text.contains(needle) && *err == is_error)
}
