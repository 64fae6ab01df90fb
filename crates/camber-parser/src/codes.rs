//! The supported G-code dialect.
//!
//! Camber targets small PCB mills with a deliberately narrow dialect:
//! motion `G0-G3`, dwell `G4`, homing/coordinate `G28/G53/G54/G92`,
//! spindle/aux `M0-M5/M7-M9`. Anything outside the table is preserved
//! verbatim and flagged with an unsupported-code warning; `G20` (inches)
//! and `G91` (incremental) are recognized but diagnosed specially because
//! silently misreading them would produce wrong physical toolpaths.

/// G numbers the target controller executes.
pub const SUPPORTED_G: &[u16] = &[0, 1, 2, 3, 4, 21, 28, 53, 54, 90, 92];

/// M numbers the target controller executes.
pub const SUPPORTED_M: &[u16] = &[0, 1, 2, 3, 4, 5, 7, 8, 9];

/// Word letters accepted as parameters (never commands).
///
/// `I`/`J` are arc center offsets, `K` the (unused) third arc axis, `R` the
/// arc radius form, `P` the dwell time.
pub const PARAMETER_LETTERS: &[char] = &['X', 'Y', 'Z', 'F', 'S', 'I', 'J', 'K', 'R', 'P'];

/// Returns `true` if the G number is in the supported dialect.
pub fn is_supported_g(g: u16) -> bool {
    SUPPORTED_G.contains(&g)
}

/// Returns `true` if the M number is in the supported dialect.
pub fn is_supported_m(m: u16) -> bool {
    SUPPORTED_M.contains(&m)
}

/// Returns `true` if `letter` is a recognized parameter word.
pub fn is_parameter_letter(letter: char) -> bool {
    PARAMETER_LETTERS.contains(&letter.to_ascii_uppercase())
}

/// Heuristic: G codes that typically appear in a program header.
pub fn is_header_g(g: u16) -> bool {
    matches!(g, 28 | 53)
}

/// Heuristic: M codes that typically appear in a program header.
pub fn is_header_m(m: u16) -> bool {
    matches!(m, 3 | 7 | 8)
}

/// Heuristic: G codes that typically appear in a program footer.
pub fn is_footer_g(g: u16) -> bool {
    matches!(g, 28)
}

/// Heuristic: M codes that typically appear in a program footer.
pub fn is_footer_m(m: u16) -> bool {
    matches!(m, 0 | 2 | 5 | 9)
}
