//! Matches pre-base vowel sign variants to the bases of an Indic font and
//! writes the OpenType feature source for the result.

use matra_variants::core;

fn main() {
    let cli_args = core::platform::get_cli_args();
    match core::run_app(cli_args) {
        Ok(()) => {}
        Err(error) => core::platform::handle_error(error),
    }
}
