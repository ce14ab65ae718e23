//! Consultation flow
//!
//! Computes the deterministic reading for the next sequence number, lets the
//! enhancer add to it if one is available, appends the event and saves.

use tracing::info;

use crate::enhancer::{enhance_reading, Enhancer};
use crate::error::VaultResult;
use crate::models::Event;
use crate::oracle::generate_reading;

use super::session::Session;

/// Ask a soul a question and record the answer
///
/// `enhancer_available` comes from the probe done once at startup.
pub async fn consult(
    session: &mut Session,
    soul_name: &str,
    question: &str,
    enhancer: Option<&Enhancer>,
    enhancer_available: bool,
) -> VaultResult<Event> {
    let (seed, sequence_number) = {
        let soul = session.soul(soul_name)?;
        (soul.seed.clone(), soul.next_sequence_number())
    };

    let reading = generate_reading(question, &seed, sequence_number);
    let reading = enhance_reading(
        reading,
        question,
        &seed,
        sequence_number,
        enhancer,
        enhancer_available,
    )
    .await;

    let event = session.record_event(soul_name, question, reading)?;

    info!(
        soul = soul_name,
        sequence_number = event.sequence_number,
        enhanced = event.reading.enhancement.is_some(),
        "recorded consultation"
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultPaths;
    use crate::crypto::KdfParams;
    use crate::storage::CredentialStore;
    use tempfile::TempDir;

    fn unlocked() -> (TempDir, VaultPaths, Session) {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut credentials =
            CredentialStore::open(paths.credentials_file(), KdfParams::pbkdf2(1_000)).unwrap();
        credentials.register("alice", "correcthorse1").unwrap();
        let session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        (temp_dir, paths, session)
    }

    #[tokio::test]
    async fn test_same_question_twice() {
        let (_temp_dir, paths, mut session) = unlocked();
        session.create_soul("Self").unwrap();

        let first = consult(&mut session, "Self", "What now?", None, false)
            .await
            .unwrap();
        let second = consult(&mut session, "Self", "What now?", None, false)
            .await
            .unwrap();

        assert_eq!(first.sequence_number, 1);
        assert_eq!(second.sequence_number, 2);
        assert_ne!(first.reading, second.reading);

        let seed = session.soul("Self").unwrap().seed.clone();
        assert_eq!(first.reading, generate_reading("What now?", &seed, 1));

        // saved without an explicit save call
        drop(session);
        let session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        assert_eq!(session.soul("Self").unwrap().events.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_soul() {
        let (_temp_dir, _paths, mut session) = unlocked();
        let err = consult(&mut session, "Nobody", "hello?", None, false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_sequence() {
        let (_temp_dir, paths, mut session) = unlocked();
        session.create_soul("Self").unwrap();

        let temp = paths.record_file("alice").with_extension("json.tmp");
        std::fs::create_dir_all(&temp).unwrap();
        assert!(consult(&mut session, "Self", "What now?", None, false)
            .await
            .is_err());
        assert_eq!(session.soul("Self").unwrap().events.len(), 0);

        std::fs::remove_dir(&temp).unwrap();
        let event = consult(&mut session, "Self", "What now?", None, false)
            .await
            .unwrap();
        assert_eq!(event.sequence_number, 1);
    }
}
