//! Helpers for streaming successive poll snapshots

/// Portion of `output` not yet printed, given `printed` bytes already shown
///
/// Poll output is lossily decoded, so a snapshot taken mid-character ends in
/// U+FFFD that the next snapshot replaces with the real character. While the
/// command is still running that trailing replacement is held back.
pub fn unprinted_suffix(output: &str, printed: usize, finished: bool) -> &str {
    let visible = if finished {
        output
    } else {
        output.trim_end_matches('\u{fffd}')
    };
    visible.get(printed..).unwrap_or("")
}
