use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::{bounded, Receiver, Sender};

use spar_core::combo::{
    parse_combination, GeneratedSource, SuggestError, SuggestionClient, SuggestionReply,
    SuggestionRequest, SuggestionResponse, HISTORY_WINDOW,
};
use spar_core::SessionError;
use spar_schema::PunchType;

/// Test double for the suggestion service: records every request and lets
/// the test resolve replies by hand.
#[derive(Default)]
struct ManualClient {
    requests: Rc<RefCell<Vec<SuggestionRequest>>>,
    outstanding: Rc<RefCell<Vec<Sender<SuggestionReply>>>>,
}

impl ManualClient {
    fn handles(
        &self,
    ) -> (
        Rc<RefCell<Vec<SuggestionRequest>>>,
        Rc<RefCell<Vec<Sender<SuggestionReply>>>>,
    ) {
        (self.requests.clone(), self.outstanding.clone())
    }
}

impl SuggestionClient for ManualClient {
    fn suggest(&self, request: SuggestionRequest) -> Receiver<SuggestionReply> {
        let (tx, rx) = bounded(1);
        self.requests.borrow_mut().push(request);
        self.outstanding.borrow_mut().push(tx);
        rx
    }
}

fn resolve(outstanding: &Rc<RefCell<Vec<Sender<SuggestionReply>>>>, reply: SuggestionReply) {
    let tx = outstanding.borrow_mut().remove(0);
    tx.send(reply).unwrap();
}

fn suggestion(text: &str) -> SuggestionReply {
    Ok(SuggestionResponse {
        suggested_combination: text.to_string(),
    })
}

#[test]
fn parse_drops_invalid_tokens_and_truncates() {
    // N valid + M invalid tokens -> min(N, max) entries, original order.
    assert_eq!(
        parse_combination("1-2-9", 2),
        vec![PunchType::Jab, PunchType::Cross]
    );
    assert_eq!(
        parse_combination("1 2, 3-4", 10),
        vec![
            PunchType::Jab,
            PunchType::Cross,
            PunchType::LeftHook,
            PunchType::RightHook
        ]
    );
    assert_eq!(
        parse_combination("x 5 - y , 6", 10),
        vec![PunchType::LeftUppercut, PunchType::RightUppercut]
    );
    assert!(parse_combination("", 5).is_empty());
    assert!(parse_combination("7 8 9 0", 5).is_empty());
}

#[test]
fn request_serializes_with_service_field_names() {
    let request = SuggestionRequest {
        recent_combinations: vec!["1-2".to_string()],
        max_punches: 5,
        player_accuracy: Some(85.5),
        custom_prompt: None,
        generation: 3,
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["recentCombinations"][0], "1-2");
    assert_eq!(json["maxPunches"], 5);
    assert_eq!(json["playerAccuracy"], 85.5);
    // Internal correlation and absent options stay off the wire.
    assert!(json.get("generation").is_none());
    assert!(json.get("customPrompt").is_none());
}

#[test]
fn at_most_one_fetch_outstanding() {
    let client = ManualClient::default();
    let (requests, _outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    source.request_next(Some(50.0));
    source.request_next(None);

    assert!(source.in_flight());
    assert_eq!(requests.borrow().len(), 1);
}

#[test]
fn poll_installs_parsed_combination() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 3, None);

    source.request_next(None);
    assert!(source.poll().is_none(), "no reply yet");

    resolve(&outstanding, suggestion("1-2-9-4"));
    assert_eq!(source.poll(), Some(Ok(())));
    assert!(!source.in_flight());

    // '9' dropped, then truncated to complexity 3.
    assert_eq!(source.current_punch(), Some(PunchType::Jab));
    source.advance();
    assert_eq!(source.current_punch(), Some(PunchType::Cross));
    source.advance();
    assert_eq!(source.current_punch(), Some(PunchType::RightHook));
    source.advance();
    assert!(source.exhausted());
}

#[test]
fn history_window_is_bounded_and_most_recent_last() {
    let client = ManualClient::default();
    let (requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    for i in 0..HISTORY_WINDOW + 2 {
        source.request_next(None);
        resolve(&outstanding, suggestion(&format!("1-{}", i)));
        assert_eq!(source.poll(), Some(Ok(())));
    }
    source.request_next(None);

    let last = requests.borrow().last().unwrap().clone();
    assert_eq!(last.recent_combinations.len(), HISTORY_WINDOW);
    assert_eq!(last.recent_combinations.last().unwrap(), "1-6");
    assert_eq!(last.recent_combinations.first().unwrap(), "1-2");
}

#[test]
fn fetch_failure_is_fatal() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    resolve(&outstanding, Err(SuggestError("model overloaded".to_string())));

    match source.poll() {
        Some(Err(SessionError::SuggestionFailed(msg))) => {
            assert!(msg.contains("model overloaded"))
        }
        other => panic!("expected SuggestionFailed, got {:?}", other),
    }
}

#[test]
fn zero_valid_punches_is_fatal() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    resolve(&outstanding, suggestion("9 8 throw hands"));

    match source.poll() {
        Some(Err(SessionError::EmptyCombination(raw))) => {
            assert_eq!(raw, "9 8 throw hands")
        }
        other => panic!("expected EmptyCombination, got {:?}", other),
    }
}

#[test]
fn stale_reply_is_discarded_after_invalidate() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    // Session stopped/restarted while the fetch was in flight.
    source.invalidate();
    resolve(&outstanding, suggestion("1-2-3"));

    assert!(source.poll().is_none(), "stale reply must not install");
    assert!(source.exhausted());
    assert!(!source.in_flight());
}

#[test]
fn stale_channel_close_is_not_fatal() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    source.invalidate();
    // The service aborts the superseded request instead of replying.
    outstanding.borrow_mut().clear();

    assert!(source.poll().is_none(), "stale close must not surface");
    assert!(!source.in_flight());

    // The restarted session fetches normally afterwards.
    source.request_next(None);
    resolve(&outstanding, suggestion("1-2"));
    assert_eq!(source.poll(), Some(Ok(())));
    assert_eq!(source.current_punch(), Some(PunchType::Jab));
}

#[test]
fn current_channel_close_is_fatal() {
    let client = ManualClient::default();
    let (_requests, outstanding) = client.handles();
    let mut source = GeneratedSource::new(Box::new(client), 5, None);

    source.request_next(None);
    outstanding.borrow_mut().clear();

    match source.poll() {
        Some(Err(SessionError::SuggestionFailed(msg))) => {
            assert!(msg.contains("channel closed"))
        }
        other => panic!("expected SuggestionFailed, got {:?}", other),
    }
}
