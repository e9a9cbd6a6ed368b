//! Resource: find who to contact.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::brief::{contactable_aid, render_aid, request_brief, ResourceBrief};
use super::rescue::source_title;
use crate::domains::triage::activities::analyze_query::crisis_or_guess;
use crate::domains::triage::data::contacts::{directory_for, DirectoryContact};
use crate::domains::triage::errors::HandlerError;
use crate::domains::triage::models::{AgentResponse, InfoType, Intent, QueryInfo};
use crate::kernel::{ContactMap, SearchResult, TriageDeps};
use contact_extraction::SearchError;

const PROGRESS_SOURCE: &str = "resource_agent";

pub const NO_RESOURCES_MESSAGE: &str = "I couldn't find any specific resources for your query. \
     Please try again with more details about your location and the type of emergency.";

pub const NO_CONTACTS_MESSAGE: &str = "I couldn't find specific contact information for the \
     resources. Please try contacting general emergency services or check official government \
     websites for your location.";

lazy_static! {
    static ref URL_IN_TEXT: Regex = Regex::new(r#"https?://[^\s<>()\[\]"']+"#).unwrap();
}

pub async fn handle_resource(
    query: &str,
    query_info: &QueryInfo,
    deps: &TriageDeps,
) -> Result<AgentResponse, HandlerError> {
    let supplied = urls_in(query);

    let results = if supplied.is_empty() {
        deps.progress
            .notify(PROGRESS_SOURCE, "Searching for relevant resources...");
        search(query, query_info, deps).await?
    } else {
        deps.progress.notify(
            PROGRESS_SOURCE,
            &format!("Using {} URL(s) from the query", supplied.len()),
        );
        supplied
            .iter()
            .filter_map(|u| SearchResult::from_url(u))
            .collect()
    };

    if results.is_empty() {
        info!("No resources found, answering with directory contacts");
        return Ok(no_resources(query, query_info));
    }

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    let contacts = deps.aggregator().collect(&urls).await;

    deps.progress
        .notify(PROGRESS_SOURCE, "Synthesizing resource information for user...");

    let prompt = build_resource_prompt(query, query_info, &results, &contacts);
    let (text, used_local) = match request_brief::<ResourceBrief>(&prompt, deps).await {
        Some(brief) if brief.summary.is_some() => (render_remote(brief, &contacts, &results), false),
        _ => (render_local(&contacts, &results), true),
    };

    let found = contacts
        .values()
        .filter_map(|o| o.record())
        .map(|r| r.emergency_phones().len() + r.phones().len() + r.emails().len() + r.addresses().len())
        .sum::<usize>();
    info!(sources = contacts.len(), contacts = found, used_local, "Resource answer ready");

    Ok(AgentResponse::new(InfoType::ResourceInformation, text)
        .with_data(json!({
            "query": query,
            "location": query_info.location,
            "urls_searched": urls,
            "contact_info": contacts,
            "contact_count": found,
        }))
        .with_intent(Intent::Resource)
        .local(used_local))
}

/// URLs written into the query, in order, without trailing punctuation.
fn urls_in(query: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for m in URL_IN_TEXT.find_iter(query) {
        let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// A search error fails the handler; a slow search counts as an error.
async fn search(
    query: &str,
    query_info: &QueryInfo,
    deps: &TriageDeps,
) -> Result<Vec<SearchResult>, HandlerError> {
    let search_query = match &query_info.location {
        Some(location) if !query.to_lowercase().contains(&location.to_lowercase()) => {
            format!("{} {}", query, location)
        }
        _ => query.to_string(),
    };

    let results = tokio::time::timeout(
        deps.settings.collaborator_timeout,
        deps.web_searcher
            .search_with_limit(&search_query, deps.settings.search_results),
    )
    .await
    .unwrap_or(Err(SearchError::Timeout))
    .map_err(|e| {
        warn!(error = %e, query = %search_query, "Resource search failed");
        e
    })?;

    Ok(results)
}

fn no_resources(query: &str, query_info: &QueryInfo) -> AgentResponse {
    let directory = directory_for(query, query_info.needs_medical, crisis_or_guess(query_info));
    let lines = directory
        .iter()
        .map(DirectoryContact::line)
        .collect::<Vec<_>>()
        .join("\n");

    AgentResponse::new(
        InfoType::ResourceInformation,
        format!("{}\n\nGeneral emergency contacts:\n{}", NO_RESOURCES_MESSAGE, lines),
    )
    .with_data(json!({
        "query": query,
        "location": query_info.location,
        "urls_searched": [],
        "emergency_contacts": directory,
    }))
    .with_intent(Intent::Resource)
    .local(true)
}

fn render_remote(brief: ResourceBrief, contacts: &ContactMap, results: &[SearchResult]) -> String {
    let aid = if brief.contactable_aid.is_empty() {
        contactable_aid(contacts, |url| source_title(results, url))
    } else {
        brief.contactable_aid
    };

    format!(
        "{}\n\nEMERGENCY CONTACTS:\n{}",
        brief.summary.unwrap_or_default(),
        render_aid(&aid)
    )
}

/// Per-source listing straight from the extracted records.
fn render_local(contacts: &ContactMap, results: &[SearchResult]) -> String {
    let mut parts = vec!["Here are the emergency contacts I found for you:".to_string()];

    for (url, outcome) in contacts {
        let Some(record) = outcome.record() else {
            continue;
        };
        if record.is_empty() {
            continue;
        }

        parts.push(format!("\n--- Contacts from {} ---", source_title(results, url)));
        let sections: [(&str, &[String]); 4] = [
            ("EMERGENCY NUMBERS", record.emergency_phones()),
            ("OTHER CONTACT NUMBERS", record.phones()),
            ("EMAIL CONTACTS", record.emails()),
            ("PHYSICAL LOCATIONS", record.addresses()),
        ];
        for (heading, values) in sections {
            if values.is_empty() {
                continue;
            }
            parts.push(format!("\n{}:", heading));
            parts.extend(values.iter().map(|v| format!("- {}", v)));
        }
    }

    if parts.len() == 1 {
        parts.push(format!("\n{}", NO_CONTACTS_MESSAGE));
    }
    parts.join("\n")
}

fn build_resource_prompt(
    query: &str,
    query_info: &QueryInfo,
    results: &[SearchResult],
    contacts: &ContactMap,
) -> String {
    let sources: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "name": r.title.as_deref().unwrap_or("Unknown Source"),
                "link": r.url.as_str(),
                "snippet": r.snippet,
                "extracted_contact": contacts.get(r.url.as_str()),
            })
        })
        .collect();

    format!(
        r#"You are an AI disaster response assistant named C.L.A.R.I.O.N.
The user is looking for emergency resources. Summarize who they should contact using ONLY the extracted contacts below.

Query: "{}"
Location: {}

SOURCES:
{:#}

Return a JSON object with:
1. "summary": Two or three sentences telling the user who to contact first and why
2. "contactable_aid": List of sources, each {{"name": ..., "contacts": [{{"type": ..., "value": ...}}]}}

Return ONLY the JSON object with no additional text."#,
        query,
        query_info.location.as_deref().unwrap_or("Unknown"),
        Value::Array(sources)
    )
}
