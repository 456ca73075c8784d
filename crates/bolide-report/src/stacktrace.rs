//! Stacktrace formatting.

use bolide_payload::StackFrame;

use crate::frames::{resolve_frame, FrameContext, RawFrame, UNKNOWN_FILE};

/// Normalise an ordered stack, innermost call first, preserving order.
///
/// Entries with a concrete location go through full frame resolution,
/// including snippet extraction. Entries without one (the empty
/// location marker, or an error-info annotation with no usable
/// location) are synthesised instead: file, line and in-project flag
/// are reused from the most recently emitted frame, and only the
/// method name is computed fresh. The receiving service groups errors
/// by the top frame's location, so defaulting such frames to "unknown"
/// would merge unrelated errors into one group.
pub(crate) fn format_stacktrace(stack: &[RawFrame], ctx: &FrameContext<'_>) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::with_capacity(stack.len());
    for raw in stack {
        let frame = if raw.location().source().is_some() {
            resolve_frame(raw, ctx)
        } else {
            synthesise_frame(raw, frames.last(), ctx)
        };
        frames.push(frame);
    }
    frames
}

/// Backfill a frame that carries no usable location from its
/// neighbour, or from the `{unknown, 0, false}` defaults when it is
/// the first frame.
fn synthesise_frame(
    raw: &RawFrame,
    previous: Option<&StackFrame>,
    ctx: &FrameContext<'_>,
) -> StackFrame {
    let (file, line_number, in_project) = match previous {
        Some(frame) => (frame.file.clone(), frame.line_number, frame.in_project),
        None => (UNKNOWN_FILE.to_owned(), 0, false),
    };
    StackFrame {
        file,
        line_number,
        in_project,
        method: ctx.sanitise(&raw.qualified_name()),
        code: None,
    }
}
