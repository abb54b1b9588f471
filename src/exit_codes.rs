//! Process exit codes.
//!
//! - 0: success (including an interrupted-but-graceful shutdown)
//! - 1: input error (bad location token, missing file)
//! - 2: template rendering failure
//! - 3: image build failure
//! - 4: container run failure
//! - 5: filesystem failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Input error: malformed location token or a referenced file does not exist.
pub const INPUT_ERROR: i32 = 1;

/// Template failure: unreadable template or unresolvable template syntax.
pub const TEMPLATE_FAILURE: i32 = 2;

/// The build collaborator returned a non-zero exit code.
pub const BUILD_FAILURE: i32 = 3;

/// The run collaborator returned a non-zero exit code.
pub const RUN_FAILURE: i32 = 4;

/// Filesystem operation failed (build context population, output write).
pub const IO_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            INPUT_ERROR,
            TEMPLATE_FAILURE,
            BUILD_FAILURE,
            RUN_FAILURE,
            IO_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
