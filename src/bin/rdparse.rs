//! Command-line front end to the built-in grammars.
//!
//! ## Usage
//! ```bash
//! rdparse calc " (1+5-4)*(2/(2-1)) "
//! rdparse calc "1+2*3" --engine simple --trace
//! rdparse list "a,a,a" --json
//! rdparse dump calc-left
//! rdparse check list
//! ```

fn main() {
    rdparse::cli::run();
}
