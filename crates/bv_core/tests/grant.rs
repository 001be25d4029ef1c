use bv_core::app_error::{AppError, AppResult};
use bv_core::grant::{
    AccessPrompt, DirProbePrompt, GrantStatus, PermissionBroker, PromptOutcome,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Scripted prompt: answers in order, counts calls, dismisses when empty.
struct SeqPrompt {
    answers: RefCell<Vec<PromptOutcome>>,
    calls: Rc<RefCell<usize>>,
}

impl SeqPrompt {
    fn new(mut answers: Vec<PromptOutcome>) -> Self {
        answers.reverse();
        Self {
            answers: RefCell::new(answers),
            calls: Rc::new(RefCell::new(0)),
        }
    }

    fn call_counter(&self) -> Rc<RefCell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl AccessPrompt for SeqPrompt {
    fn request_root(&self) -> AppResult<PromptOutcome> {
        *self.calls.borrow_mut() += 1;
        Ok(self
            .answers
            .borrow_mut()
            .pop()
            .unwrap_or(PromptOutcome::Dismissed))
    }
}

struct FailingPrompt;

impl AccessPrompt for FailingPrompt {
    fn request_root(&self) -> AppResult<PromptOutcome> {
        Err(AppError::new(
            "BV_ACCESS_DENIED",
            "access",
            "platform refused the directory picker",
            true,
            serde_json::json!({}),
        ))
    }
}

#[test]
fn dismissal_resolves_to_denied_without_error() {
    let mut broker = PermissionBroker::new(Box::new(DirProbePrompt::dismissed()));
    let grant = broker.request().expect("dismissal is not an error");
    assert_eq!(grant.status, GrantStatus::Denied);
    assert!(grant.root.is_none());
}

#[test]
fn denied_grant_can_be_rerequested_and_granted() {
    let temp = tempfile::tempdir().expect("tempdir");
    let prompt = SeqPrompt::new(vec![
        PromptOutcome::Dismissed,
        PromptOutcome::Granted(temp.path().to_path_buf()),
    ]);
    let mut broker = PermissionBroker::new(Box::new(prompt));

    assert_eq!(broker.current().status, GrantStatus::Unrequested);
    let first = broker.request().expect("first request").status;
    assert_eq!(first, GrantStatus::Denied);
    let second = broker.request().expect("second request").status;
    assert_eq!(second, GrantStatus::Granted);
    assert_eq!(broker.current().root, Some(temp.path().to_path_buf()));
}

#[test]
fn granted_is_terminal_and_does_not_reprompt() {
    let temp = tempfile::tempdir().expect("tempdir");
    let prompt = SeqPrompt::new(vec![PromptOutcome::Granted(temp.path().to_path_buf())]);
    let calls = prompt.call_counter();
    let mut broker = PermissionBroker::new(Box::new(prompt));

    broker.request().expect("first request");
    broker.request().expect("second request");
    assert_eq!(broker.current().status, GrantStatus::Granted);
    // One prompt interaction only; the second call reused the grant.
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn prompt_failure_surfaces_access_error_and_denies() {
    let mut broker = PermissionBroker::new(Box::new(FailingPrompt));
    let err = broker.request().expect_err("prompt failure should surface");
    assert!(err.is_access());
    assert_eq!(broker.current().status, GrantStatus::Denied);
}

#[test]
fn unreachable_candidate_root_is_an_access_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let gone = temp.path().join("never-created");
    let mut broker = PermissionBroker::new(Box::new(DirProbePrompt::granting(gone)));

    let err = broker.request().expect_err("probe should fail");
    assert!(err.is_access());
    assert_eq!(err.code, "BV_ROOT_UNAVAILABLE");
    assert_eq!(broker.current().status, GrantStatus::Denied);
}

#[test]
fn invalidate_drops_grant_to_denied() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut broker = PermissionBroker::new(Box::new(DirProbePrompt::granting(
        temp.path().to_path_buf(),
    )));
    broker.request().expect("request");
    assert_eq!(broker.current().status, GrantStatus::Granted);

    broker.invalidate();
    assert_eq!(broker.current().status, GrantStatus::Denied);
    assert!(broker.current().root.is_none());
}

#[test]
fn reuse_validates_remembered_root_without_prompting() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut broker = PermissionBroker::new(Box::new(DirProbePrompt::dismissed()));

    assert!(broker.reuse(temp.path()));
    assert_eq!(broker.current().status, GrantStatus::Granted);

    let mut fresh = PermissionBroker::new(Box::new(DirProbePrompt::dismissed()));
    assert!(!fresh.reuse(&PathBuf::from("/nonexistent/bv-root")));
    assert_eq!(fresh.current().status, GrantStatus::Unrequested);
}
