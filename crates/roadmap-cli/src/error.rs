// CLI errors are handled via anyhow at the top level.
// This module turns them into the text shown to the user.

use roadmap_core::FormatError;
use roadmap_sync::SyncError;

pub fn format_error(err: &anyhow::Error) -> String {
    let mut msg = format!("error: {err}");
    for cause in err.chain().skip(1) {
        msg.push_str(&format!("\n  caused by: {cause}"));
    }
    if let Some(hint) = hint(err) {
        msg.push_str(&format!("\n  hint: {hint}"));
    }
    msg
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let sync = err.chain().find_map(|c| c.downcast_ref::<SyncError>())?;
    if sync.needs_sign_in() {
        return Some("run `roadmap auth login` first");
    }
    match sync {
        SyncError::Format(FormatError::Incompatible) => {
            Some("start over with `roadmap new <name>`; older roadmaps cannot be converted")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_sync::GatewayError;

    #[test]
    fn sign_in_errors_get_a_hint() {
        let err = anyhow::Error::new(SyncError::from(GatewayError::Unauthenticated));
        let text = format_error(&err);
        assert!(text.starts_with("error: please sign in"));
        assert!(text.contains("roadmap auth login"));
    }

    #[test]
    fn causes_are_listed() {
        let err = anyhow::anyhow!("inner").context("outer");
        assert_eq!(format_error(&err), "error: outer\n  caused by: inner");
    }
}
