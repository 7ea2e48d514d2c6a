//! Job request sent alongside a seed-file upload

use crate::error::CspcError;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Upload name for a seed file: `{group}-{YYYYMMDD-HHMMSS}.csv`
pub fn seed_file_name<Tz>(device_group: &str, at: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}-{}.csv", device_group, at.format("%Y%m%d-%H%M%S"))
}

/// Import job that schedules the uploaded file for immediate discovery
pub fn seed_file_request(device_group: &str, file_name: &str) -> Result<String, CspcError> {
    let mut import = Element::new("ImportSeedFileJob");
    import.attributes.insert("jobName".to_string(), "testimport".to_string());
    push_text(&mut import, "Description", "Import SeedFile Job");
    push_text(&mut import, "DeviceGroup", device_group);
    push_text(&mut import, "SeedFileDescr", "cnc seed file");
    push_text(&mut import, "SeedFileFormat", "CISCO_CNC_CSV");
    let mut details = Element::new("FileDetails");
    push_text(&mut details, "SeedFileName", file_name);
    import.children.push(XMLNode::Element(details));
    push_text(&mut import, "TriggerDiscovery", "true");
    push_text(&mut import, "TriggerDav", "false");

    let mut run_now = Element::new("JobSchedule");
    run_now.attributes.insert("runnow".to_string(), "true".to_string());

    let mut schedule = Element::new("Schedule");
    schedule.attributes.insert("operationId".to_string(), "1".to_string());
    schedule.children.push(XMLNode::Element(run_now));
    schedule.children.push(XMLNode::Element(import));

    let mut job = Element::new("Job");
    job.children.push(XMLNode::Element(schedule));
    let mut request = Element::new("Request");
    request.children.push(XMLNode::Element(job));

    let config = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false);
    let mut output = Vec::new();
    request.write_with_config(&mut output, config)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn push_text(parent: &mut Element, tag: &str, text: &str) {
    let mut child = Element::new(tag);
    if !text.is_empty() {
        child.children.push(XMLNode::Text(text.to_string()));
    }
    parent.children.push(XMLNode::Element(child));
}
