use std::fmt::Write;

use buildview::{
    result_title, Build, Builder, ClassifiedUrls, LogChunk, Step, Worker, UNKNOWN_BUILDER,
};
use comfy_table::Cell;
use indexmap::IndexMap;
use serde::Serialize;

use super::styling::{bright, cyan, dim};
use super::tables::{create_cyan_header, create_table, result_cell};
use super::time::{fmt_age, fmt_elapsed};

/// A step together with its classified links.
#[derive(Serialize)]
pub struct StepRow {
    pub step: Step,
    pub links: ClassifiedUrls,
}

fn add_section_header(output: &mut String, title: &str) {
    let _ = writeln!(output, "{}", bright(title).underlined());
}

fn builder_name(names: &IndexMap<u64, String>, id: u64) -> &str {
    names.get(&id).map_or(UNKNOWN_BUILDER, String::as_str)
}

pub fn render_builders(builders: &[Builder]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "Builders");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["ID", "Name", "Tags", "Description"]));
    for builder in builders {
        table.add_row(vec![
            Cell::new(builder.builderid),
            Cell::new(&builder.name),
            Cell::new(builder.tags.join(", ")),
            Cell::new(builder.description.as_deref().unwrap_or("")),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

pub fn render_workers(workers: &[Worker]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "Workers");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["ID", "Name", "State", "Host", "Version"]));
    for worker in workers {
        let state = match (worker.is_connected(), worker.paused, worker.graceful) {
            (false, _, _) => "disconnected",
            (true, true, _) => "paused",
            (true, false, true) => "stopping",
            (true, false, false) => "connected",
        };
        table.add_row(vec![
            Cell::new(worker.workerid),
            Cell::new(&worker.name),
            Cell::new(state),
            Cell::new(worker.workerinfo.host.as_deref().unwrap_or("")),
            Cell::new(worker.workerinfo.version.as_deref().unwrap_or("")),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

pub fn render_builds(builds: &[Build], names: &IndexMap<u64, String>, now: i64) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "Builds");

    let mut table = create_table();
    table.set_header(create_cyan_header(&[
        "Builder", "#", "Result", "State", "Started", "Duration", "Owner",
    ]));
    for build in builds {
        table.add_row(vec![
            Cell::new(builder_name(names, build.builderid)),
            Cell::new(build.number),
            result_cell(build.results),
            Cell::new(&build.state_string),
            Cell::new(fmt_age(build.started_at, now)),
            Cell::new(fmt_elapsed(Some(build.started_at), build.complete_at, now)),
            Cell::new(owners(build)),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

pub fn render_build(build: &Build, builder: &str, now: i64) -> String {
    let mut output = String::new();
    add_section_header(&mut output, &format!("{builder} #{}", build.number));

    let _ = writeln!(output, "  {} {}", cyan("Result:"), result_title(build.results));
    let _ = writeln!(output, "  {} {}", cyan("State:"), build.state_string);
    let _ = writeln!(output, "  {} {}", cyan("Started:"), fmt_age(build.started_at, now));
    let _ = writeln!(
        output,
        "  {} {}",
        cyan("Duration:"),
        fmt_elapsed(Some(build.started_at), build.complete_at, now)
    );

    if !build.properties.is_empty() {
        let mut table = create_table();
        table.set_header(create_cyan_header(&["Property", "Value", "Source"]));
        for (name, (value, source)) in &build.properties {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(value_text(value)),
                Cell::new(source),
            ]);
        }
        let _ = writeln!(output, "{table}");
    }

    output
}

pub fn render_steps(
    rows: &[StepRow],
    children: &[Build],
    names: &IndexMap<u64, String>,
    now: i64,
) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "Steps");

    let mut table = create_table();
    table.set_header(create_cyan_header(&["#", "Step", "Result", "Duration", "Links"]));
    for row in rows.iter().filter(|row| !row.step.hidden) {
        table.add_row(vec![
            Cell::new(row.step.number),
            Cell::new(&row.step.name),
            result_cell(row.step.results),
            Cell::new(fmt_elapsed(row.step.started_at, row.step.complete_at, now)),
            Cell::new(link_lines(&row.links, children, names).join("\n")),
        ]);
    }

    let _ = writeln!(output, "{table}");
    output
}

fn link_lines(
    links: &ClassifiedUrls,
    children: &[Build],
    names: &IndexMap<u64, String>,
) -> Vec<String> {
    let child_line = |build: &Build| {
        format!(
            "{} #{} ({})",
            builder_name(names, build.builderid),
            build.number,
            result_title(build.results)
        )
    };

    let mut lines = Vec::with_capacity(links.len());
    for req in &links.requests {
        let started: Vec<String> = children
            .iter()
            .filter(|build| build.buildrequestid == Some(req.reqid))
            .map(child_line)
            .collect();
        if started.is_empty() {
            lines.push(format!("{} (request {}, pending)", req.link.name, req.reqid));
        } else {
            lines.extend(started);
        }
    }
    for link in &links.builds {
        match children
            .iter()
            .find(|build| build.builderid == link.builderid && build.number == link.number)
        {
            Some(build) => lines.push(child_line(build)),
            None => lines.push(format!(
                "{} #{}",
                builder_name(names, link.builderid),
                link.number
            )),
        }
    }
    for link in &links.other {
        lines.push(format!("{}: {}", link.name, dim(&link.url)));
    }
    lines
}

pub fn render_names(names: &IndexMap<u64, String>) -> String {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["ID", "Name"]));
    for (id, name) in names {
        table.add_row(vec![Cell::new(id), Cell::new(name)]);
    }
    format!("{table}\n")
}

pub fn render_log(chunks: &[LogChunk]) -> String {
    chunks.iter().map(|chunk| chunk.content.as_str()).collect()
}

fn owners(build: &Build) -> String {
    build
        .properties
        .get("owners")
        .map(|(value, _)| value_text(value))
        .unwrap_or_default()
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Array(items) => {
            items.iter().map(value_text).collect::<Vec<_>>().join(", ")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildview::{classify_step_urls, StepUrl};
    use serde_json::json;

    fn build(builderid: u64, number: u64, reqid: Option<u64>, results: Option<i64>) -> Build {
        serde_json::from_value(json!({
            "buildid": builderid * 100 + number,
            "builderid": builderid,
            "number": number,
            "buildrequestid": reqid,
            "started_at": 0,
            "results": results
        }))
        .unwrap()
    }

    #[test]
    fn test_link_lines_resolve_children() {
        let links = classify_step_urls(vec![
            StepUrl::new("child", "#buildrequests/5"),
            StepUrl::new("other child", "#builders/2/builds/9"),
            StepUrl::new("waiting", "#buildrequests/6"),
            StepUrl::new("artifact", "file-store/out.tar"),
        ]);
        let children = vec![build(1, 3, Some(5), Some(0)), build(2, 9, None, None)];
        let names: IndexMap<u64, String> = [(1, "linux".to_string()), (2, "mac".to_string())]
            .into_iter()
            .collect();

        let lines = link_lines(&links, &children, &names);

        assert_eq!(lines[0], "linux #3 (success)");
        assert_eq!(lines[1], "waiting (request 6, pending)");
        assert_eq!(lines[2], "mac #9 (in progress)");
        assert!(lines[3].starts_with("artifact: "));
        assert!(lines[3].contains("/file-store/out.tar"));
    }

    #[test]
    fn test_unknown_builder_name() {
        let names = IndexMap::new();
        assert_eq!(builder_name(&names, 3), UNKNOWN_BUILDER);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(["a", "b"])), "a, b");
        assert_eq!(value_text(&json!("x")), "x");
        assert_eq!(value_text(&json!(3)), "3");
    }

    #[test]
    fn test_render_log_concatenates_chunks() {
        let chunks = vec![
            LogChunk { logid: 1, firstline: 0, content: "a\n".into() },
            LogChunk { logid: 1, firstline: 1, content: "b\n".into() },
        ];
        assert_eq!(render_log(&chunks), "a\nb\n");
    }
}
