//! End-to-end governance scenarios driven through the gate

use chrono::Duration;
use cutgate::{
    Address, ChangeSet, CutExecutor, CutGate, ExecutorError, FacetCut, FacetCutAction,
    FacetRegistry, GovernanceError, GovernanceEvent, InitCall, ManualClock, ProposalId,
    ProposalStatus, Selector,
};
use pretty_assertions::assert_eq;

const A: u8 = 0xa1;
const B: u8 = 0xb2;
const C: u8 = 0xc3;

fn signer(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn selector(raw: &str) -> Selector {
    raw.parse().unwrap()
}

fn add_cut(facet: u8, selectors: &[&str]) -> ChangeSet {
    ChangeSet::new(vec![FacetCut {
        facet_address: Address::repeat_byte(facet),
        action: FacetCutAction::Add,
        function_selectors: selectors.iter().map(|s| selector(s)).collect(),
    }])
}

fn registry_gate(threshold: usize) -> (CutGate<FacetRegistry, ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let gate = CutGate::new(
        vec![signer(A), signer(B), signer(C)],
        threshold,
        signer(A),
        Duration::days(7),
        FacetRegistry::new(),
        clock.clone(),
    )
    .unwrap();
    (gate, clock)
}

/// Records every change set handed to it, optionally refusing all of them
struct RecordingExecutor {
    applied: Vec<ChangeSet>,
    refuse: bool,
}

impl CutExecutor for RecordingExecutor {
    fn apply_registry_change(&mut self, change_set: &ChangeSet) -> Result<(), ExecutorError> {
        if self.refuse {
            return Err(ExecutorError::Rejected("registry locked".to_string()));
        }
        self.applied.push(change_set.clone());
        Ok(())
    }
}

fn recording_gate(threshold: usize, refuse: bool) -> CutGate<RecordingExecutor, ManualClock> {
    CutGate::new(
        vec![signer(A), signer(B), signer(C)],
        threshold,
        signer(A),
        Duration::days(7),
        RecordingExecutor {
            applied: Vec::new(),
            refuse,
        },
        ManualClock::default(),
    )
    .unwrap()
}

#[test]
fn test_construction_rejects_invalid_parameters() {
    let build = |signers: Vec<Address>, threshold: usize| {
        CutGate::new(
            signers,
            threshold,
            signer(A),
            Duration::days(7),
            FacetRegistry::new(),
            ManualClock::default(),
        )
        .err()
    };

    assert_eq!(build(vec![], 1), Some(GovernanceError::EmptySignerList));
    assert!(matches!(
        build(vec![signer(A), signer(B)], 0),
        Some(GovernanceError::InvalidVoteThreshold { threshold: 0, signers: 2 })
    ));
    assert!(matches!(
        build(vec![signer(A)], 2),
        Some(GovernanceError::InvalidVoteThreshold { .. })
    ));
    assert_eq!(
        build(vec![signer(A), signer(B), signer(C), signer(B)], 2),
        Some(GovernanceError::DuplicateSigner(signer(B)))
    );
    assert_eq!(
        build(vec![signer(A), Address::ZERO, signer(C)], 2),
        Some(GovernanceError::NullAddress)
    );
    assert_eq!(build(vec![signer(A), signer(B), signer(C)], 3), None);
}

#[test]
fn test_threshold_vote_executes_once() {
    let mut gate = recording_gate(2, false);
    let x = add_cut(0x11, &["0x12345678"]);

    let p1 = gate.propose_cut(signer(A), x.clone()).unwrap();
    let proposal = gate.get_proposal(p1).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Pending);
    assert_eq!(proposal.voters().copied().collect::<Vec<_>>(), vec![signer(A)]);
    assert!(gate.executor().applied.is_empty());

    assert_eq!(gate.vote_on_cut(signer(B), p1).unwrap(), ProposalStatus::Executed);
    let proposal = gate.get_proposal(p1).unwrap();
    assert_eq!(proposal.vote_count(), 2);
    assert!(proposal.has_voted(&signer(B)));
    assert_eq!(gate.executor().applied, vec![x]);

    assert!(matches!(
        gate.vote_on_cut(signer(C), p1),
        Err(GovernanceError::ProposalAlreadyResolved { status: ProposalStatus::Executed, .. })
    ));
    assert_eq!(gate.get_proposal(p1).unwrap().vote_count(), 2);
    assert_eq!(gate.executor().applied.len(), 1);
}

#[test]
fn test_vote_after_deadline_fails_proposal() {
    let (mut gate, clock) = registry_gate(2);
    let p2 = gate.propose_cut(signer(A), add_cut(0x22, &["0xaabbccdd"])).unwrap();

    clock.advance(Duration::days(7) + Duration::seconds(1));
    assert_eq!(
        gate.vote_on_cut(signer(B), p2).unwrap_err(),
        GovernanceError::ProposalExpired(p2)
    );

    let proposal = gate.get_proposal(p2).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Failed);
    assert_eq!(proposal.vote_count(), 1);
    assert_eq!(gate.executor().selector_count(), 0);

    // Once failed, the proposal stays failed
    assert!(matches!(
        gate.vote_on_cut(signer(C), p2),
        Err(GovernanceError::ProposalAlreadyResolved { status: ProposalStatus::Failed, .. })
    ));
}

#[test]
fn test_deadline_is_inclusive() {
    let (mut gate, clock) = registry_gate(2);
    let id = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();

    clock.advance(Duration::days(7));
    assert_eq!(
        gate.vote_on_cut(signer(B), id).unwrap_err(),
        GovernanceError::ProposalExpired(id)
    );
}

#[test]
fn test_vote_just_before_deadline_executes() {
    let (mut gate, clock) = registry_gate(2);
    let id = gate.propose_cut(signer(A), add_cut(0x33, &["0x01020304"])).unwrap();

    clock.advance(Duration::days(7) - Duration::seconds(1));
    assert_eq!(gate.vote_on_cut(signer(B), id).unwrap(), ProposalStatus::Executed);
    assert_eq!(
        gate.executor().facet_address(&selector("0x01020304")),
        Some(Address::repeat_byte(0x33))
    );
}

#[test]
fn test_threshold_one_executes_on_propose() {
    let (mut gate, _) = registry_gate(1);
    let change_set = add_cut(0x44, &["0x0a0b0c0d", "0x0e0f1011"]).with_init(InitCall {
        target: Address::repeat_byte(0x44),
        calldata: vec![0xde, 0xad],
    });

    let id = gate.propose_cut(signer(C), change_set).unwrap();
    assert_eq!(gate.get_proposal(id).unwrap().status, ProposalStatus::Executed);
    assert_eq!(gate.executor().facet_selectors(&Address::repeat_byte(0x44)).len(), 2);
    assert_eq!(gate.executor().initializations().len(), 1);

    let names: Vec<&str> = gate.events().events().map(|e| e.name()).collect();
    assert_eq!(names, vec!["NewProposal", "VoteRegistered", "ProposalExecuted"]);
}

#[test]
fn test_duplicate_vote_rejected() {
    let (mut gate, _) = registry_gate(3);
    let id = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();
    gate.vote_on_cut(signer(B), id).unwrap();

    assert_eq!(
        gate.vote_on_cut(signer(B), id).unwrap_err(),
        GovernanceError::AlreadyVoted { signer: signer(B) }
    );
    assert_eq!(
        gate.vote_on_cut(signer(A), id).unwrap_err(),
        GovernanceError::AlreadyVoted { signer: signer(A) }
    );
    assert_eq!(gate.get_proposal(id).unwrap().vote_count(), 2);
    assert!(!gate.get_vote_status(id, &signer(C)));
}

#[test]
fn test_outsider_cannot_propose_or_vote() {
    let (mut gate, _) = registry_gate(2);
    let outsider = Address::repeat_byte(0xee);

    assert_eq!(
        gate.propose_cut(outsider, ChangeSet::default()).unwrap_err(),
        GovernanceError::NotASigner(outsider)
    );
    let id = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();
    assert_eq!(
        gate.vote_on_cut(outsider, id).unwrap_err(),
        GovernanceError::NotASigner(outsider)
    );
    assert_eq!(gate.get_proposal(id).unwrap().vote_count(), 1);
}

#[test]
fn test_unknown_and_malformed_ids() {
    let (mut gate, _) = registry_gate(2);
    assert_eq!(
        gate.vote_on_cut(signer(B), ProposalId(99)).unwrap_err(),
        GovernanceError::ProposalNotFound
    );
    assert_eq!(
        gate.vote_on_cut_str(signer(B), "invalidProposalId").unwrap_err(),
        GovernanceError::ProposalNotFound
    );
    assert!(gate.get_proposal(ProposalId(99)).is_err());
    assert!(gate.events().is_empty());
}

#[test]
fn test_failed_execution_leaves_proposal_pending() {
    let mut gate = recording_gate(2, true);
    let id = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();
    let events_before = gate.events().len();

    assert!(matches!(
        gate.vote_on_cut(signer(B), id),
        Err(GovernanceError::ExecutionFailed { .. })
    ));
    let proposal = gate.get_proposal(id).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Pending);
    assert_eq!(proposal.vote_count(), 1);
    assert!(!proposal.has_voted(&signer(B)));
    assert_eq!(gate.events().len(), events_before);
}

#[test]
fn test_failed_execution_on_propose_creates_nothing() {
    let mut gate = recording_gate(1, true);
    assert!(matches!(
        gate.propose_cut(signer(A), ChangeSet::default()),
        Err(GovernanceError::ExecutionFailed { .. })
    ));
    assert!(gate.list_proposals(None).is_empty());
    assert!(gate.events().is_empty());
    assert!(gate.executor().applied.is_empty());
}

#[test]
fn test_invalid_cut_rolls_back_registry() {
    let (mut gate, _) = registry_gate(1);
    gate.propose_cut(signer(A), add_cut(0x55, &["0x11111111"])).unwrap();

    // Second cut collides with the selector bound above
    let conflicting = ChangeSet::new(vec![
        FacetCut {
            facet_address: Address::repeat_byte(0x66),
            action: FacetCutAction::Add,
            function_selectors: vec![selector("0x22222222")],
        },
        FacetCut {
            facet_address: Address::repeat_byte(0x66),
            action: FacetCutAction::Add,
            function_selectors: vec![selector("0x11111111")],
        },
    ]);
    assert!(matches!(
        gate.propose_cut(signer(B), conflicting),
        Err(GovernanceError::ExecutionFailed {
            source: ExecutorError::SelectorExists(_),
            ..
        })
    ));
    assert_eq!(gate.executor().selector_count(), 1);
    assert_eq!(gate.executor().facet_address(&selector("0x22222222")), None);
    assert_eq!(gate.list_proposals(None).len(), 1);
}

#[test]
fn test_relinquish_scenario() {
    let (mut gate, _) = registry_gate(2);
    let pending = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();

    assert!(!gate.vote_to_relinquish_cut_control(signer(A)).unwrap());
    assert_eq!(
        gate.vote_to_relinquish_cut_control(signer(A)).unwrap_err(),
        GovernanceError::AlreadyVoted { signer: signer(A) }
    );
    assert!(gate.vote_to_relinquish_cut_control(signer(B)).unwrap());
    assert!(gate.is_relinquished());
    assert!(gate
        .events()
        .events()
        .any(|e| *e == GovernanceEvent::ControlRelinquished));

    assert_eq!(
        gate.propose_cut(signer(C), ChangeSet::default()).unwrap_err(),
        GovernanceError::CutControlRelinquished
    );
    // Proposals pending at the moment of relinquishment can no longer execute
    assert_eq!(
        gate.vote_on_cut(signer(B), pending).unwrap_err(),
        GovernanceError::CutControlRelinquished
    );
    assert_eq!(gate.get_proposal(pending).unwrap().status, ProposalStatus::Pending);
    assert_eq!(
        gate.vote_to_relinquish_cut_control(signer(C)).unwrap_err(),
        GovernanceError::CutControlRelinquished
    );

    let status = gate.relinquish_status();
    assert!(status.relinquished);
    assert_eq!(status.vote_count, 2);
    assert!(gate.get_relinquish_vote_status(&signer(B)));
    assert!(!gate.get_relinquish_vote_status(&signer(C)));
}

#[test]
fn test_expiry_still_applies_after_relinquish() {
    let (mut gate, clock) = registry_gate(2);
    let id = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();
    gate.vote_to_relinquish_cut_control(signer(A)).unwrap();
    assert!(gate.vote_to_relinquish_cut_control(signer(B)).unwrap());

    clock.advance(Duration::days(8));
    assert_eq!(
        gate.vote_on_cut(signer(B), id).unwrap_err(),
        GovernanceError::ProposalExpired(id)
    );
    assert_eq!(gate.get_proposal(id).unwrap().status, ProposalStatus::Failed);
    assert_eq!(
        gate.events().events().last(),
        Some(&GovernanceEvent::ProposalFailed { proposal_id: id })
    );

    // Outsiders are still turned away first
    let outsider = Address::repeat_byte(0xee);
    assert_eq!(
        gate.vote_on_cut(outsider, id).unwrap_err(),
        GovernanceError::NotASigner(outsider)
    );
}

#[test]
fn test_unrepresentable_deadline_rejects_proposal() {
    let mut gate = CutGate::new(
        vec![signer(A), signer(B), signer(C)],
        1,
        signer(A),
        Duration::MAX,
        FacetRegistry::new(),
        ManualClock::default(),
    )
    .unwrap();

    assert_eq!(
        gate.propose_cut(signer(A), add_cut(0x88, &["0x12121212"])).unwrap_err(),
        GovernanceError::ExpirationOutOfRange
    );
    assert!(gate.list_proposals(None).is_empty());
    assert!(gate.events().is_empty());
    assert_eq!(gate.executor().selector_count(), 0);
}

#[test]
fn test_sweep_fails_only_expired_pending() {
    let (mut gate, clock) = registry_gate(2);
    let old = gate.propose_cut(signer(A), ChangeSet::default()).unwrap();
    clock.advance(Duration::days(3));
    let fresh = gate.propose_cut(signer(B), ChangeSet::default()).unwrap();
    clock.advance(Duration::days(5));

    assert_eq!(gate.get_proposal(old).unwrap().effective_status(gate.now()), ProposalStatus::Failed);
    assert_eq!(gate.sweep_expired(), vec![old]);
    assert_eq!(gate.get_proposal(old).unwrap().status, ProposalStatus::Failed);
    assert_eq!(gate.get_proposal(fresh).unwrap().status, ProposalStatus::Pending);
    assert!(gate.sweep_expired().is_empty());

    assert_eq!(gate.list_proposals(Some(ProposalStatus::Failed)).len(), 1);
    assert_eq!(gate.list_proposals(Some(ProposalStatus::Pending)).len(), 1);
}

#[test]
fn test_event_sequence_for_full_lifecycle() {
    let (mut gate, clock) = registry_gate(2);
    let executed = gate.propose_cut(signer(A), add_cut(0x77, &["0x99999999"])).unwrap();
    gate.vote_on_cut(signer(C), executed).unwrap();
    let expired = gate.propose_cut(signer(B), ChangeSet::default()).unwrap();
    clock.advance(Duration::days(8));
    let _ = gate.vote_on_cut(signer(A), expired);

    let names: Vec<&str> = gate.events().events().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "NewProposal",
            "VoteRegistered",
            "VoteRegistered",
            "ProposalExecuted",
            "NewProposal",
            "VoteRegistered",
            "ProposalFailed",
        ]
    );

    let tail = gate.events_since(5);
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].sequence, 6);
}
