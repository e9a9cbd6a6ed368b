//! Integration tests for batch contact aggregation.

use std::sync::Arc;
use std::time::Duration;

use contact_extraction::{
    testing::{MockContactAssist, MockFetcher, RecordingProgress},
    ContactAggregator, ContactOutcome, ContactRecord,
};

const COUNTY_PAGE: &str = "\
# Harris County Flood Desk
Emergency Hotline: (800) 555-0123
Office: 713-555-0100
floods@harriscounty.gov";

const SHELTER_PAGE: &str = "\
**Shelter Address**
2000 Edwards St
Houston, TX 77007";

fn aggregator(fetcher: MockFetcher) -> ContactAggregator {
    ContactAggregator::new(Arc::new(fetcher))
}

#[tokio::test]
async fn test_collect_preserves_input_order_and_isolates_failures() {
    let fetcher = MockFetcher::new()
        .with_page("https://county.gov/flood", COUNTY_PAGE)
        .with_failure("https://down.example.org")
        .with_page("https://shelters.org", SHELTER_PAGE);

    let urls = [
        "https://county.gov/flood",
        "https://down.example.org",
        "https://shelters.org",
    ];
    let contacts = aggregator(fetcher).collect(&urls).await;

    let keys: Vec<&str> = contacts.keys().map(String::as_str).collect();
    assert_eq!(keys, urls);

    let county = contacts["https://county.gov/flood"].record().unwrap();
    assert_eq!(county.emergency_phones(), &["8005550123".to_string()]);
    assert_eq!(county.phones(), &["7135550100".to_string()]);

    match &contacts["https://down.example.org"] {
        ContactOutcome::Failed { error } => assert_eq!(error.kind, "fetch_failed"),
        other => panic!("expected failure, got {:?}", other),
    }

    let shelter = contacts["https://shelters.org"].record().unwrap();
    assert_eq!(shelter.addresses().len(), 1);
}

#[tokio::test]
async fn test_same_sources_twice_give_identical_maps() {
    let fetcher = MockFetcher::new()
        .with_page("https://a.org", COUNTY_PAGE)
        .with_page("https://b.org", SHELTER_PAGE);
    let aggregator = aggregator(fetcher);

    let urls = ["https://a.org", "https://b.org"];
    let first = aggregator.collect(&urls).await;
    let second = aggregator.collect(&urls).await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_duplicate_urls_are_fetched_once() {
    let fetcher = MockFetcher::new().with_page("https://a.org", COUNTY_PAGE);
    let aggregator = aggregator(fetcher.clone());

    let contacts = aggregator
        .collect(&["https://a.org", "https://a.org"])
        .await;

    assert_eq!(contacts.len(), 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let fetcher = MockFetcher::new()
        .with_page("https://slow.org", COUNTY_PAGE)
        .with_delay("https://slow.org", Duration::from_millis(200));

    let contacts = aggregator(fetcher)
        .with_fetch_timeout(Duration::from_millis(20))
        .collect(&["https://slow.org"])
        .await;

    match &contacts["https://slow.org"] {
        ContactOutcome::Failed { error } => assert_eq!(error.kind, "timeout"),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_assist_replaces_record_without_reachable_contacts() {
    let assisted = ContactRecord::new(
        vec![],
        vec!["6125550155".to_string()],
        vec!["desk@county.gov".to_string()],
        vec![],
    );
    let assist = MockContactAssist::new().with_record("https://prose.org", assisted.clone());
    let fetcher = MockFetcher::new()
        .with_page("https://prose.org", "Reach the county desk by phone any weekday.")
        .with_page("https://a.org", COUNTY_PAGE);

    let contacts = aggregator(fetcher)
        .with_assist(Arc::new(assist.clone()))
        .collect(&["https://prose.org", "https://a.org"])
        .await;

    assert_eq!(contacts["https://prose.org"].record(), Some(&assisted));
    // Pages with deterministic hits never reach the assist
    assert_eq!(assist.calls(), vec!["https://prose.org".to_string()]);
}

#[tokio::test]
async fn test_failed_assist_keeps_deterministic_record() {
    let fetcher = MockFetcher::new().with_page("https://prose.org", SHELTER_PAGE);

    let contacts = aggregator(fetcher)
        .with_assist(Arc::new(MockContactAssist::new()))
        .collect(&["https://prose.org"])
        .await;

    let record = contacts["https://prose.org"].record().unwrap();
    assert!(record.has_no_reachable_contact());
    assert_eq!(record.addresses().len(), 1);
}

#[tokio::test]
async fn test_progress_is_reported_per_source() {
    let progress = RecordingProgress::new();
    let fetcher = MockFetcher::new()
        .with_page("https://a.org", COUNTY_PAGE)
        .with_failure("https://b.org");

    aggregator(fetcher)
        .with_progress(Arc::new(progress.clone()))
        .collect(&["https://a.org", "https://b.org"])
        .await;

    let messages = progress.messages_from("contact_aggregator");
    assert!(messages.iter().any(|m| m == "Fetching https://a.org"));
    assert!(messages.iter().any(|m| m.starts_with("Could not fetch https://b.org")));
    assert!(messages
        .iter()
        .any(|m| m.starts_with("Found 1 emergency numbers, 1 phone numbers, 1 emails")));
}
