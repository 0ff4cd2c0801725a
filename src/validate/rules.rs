//! Cross-entity consistency rules
//!
//! Every rule appends to the report and keeps going, so one run surfaces the full
//! list of defects.

use super::ValidationReport;
use super::schema::{CheckedDocument, Group, ModelEntry};
use super::suggest;
use crate::macros::{MacroTable, tokens};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

/// Phase two: run all consistency rules over the entities that passed phase one
pub fn check_consistency(doc: &CheckedDocument, report: &mut ValidationReport) {
    let aliases = check_aliases(&doc.models, report);
    check_groups(&doc.groups, &doc.declared_models, report);
    check_preload(&doc.preload, &doc.declared_models, &aliases, report);
    check_profiles(&doc.profiles, &doc.declared_models, &aliases, report);
    check_macro_references(&doc.models, &doc.macros, report);
    check_port_usage(&doc.models, report);
    check_macro_cycles(&doc.macros, report);
    check_unused_macros(&doc.models, &doc.macros, report);
}

/// Alias -> owning model id; an alias claimed by a second model is an error
fn check_aliases<'a>(
    models: &'a IndexMap<String, ModelEntry>,
    report: &mut ValidationReport,
) -> HashMap<&'a str, &'a str> {
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for (id, model) in models {
        for alias in model.aliases() {
            match owners.get(alias.as_str()) {
                Some(owner) if *owner == id.as_str() => {
                    report.add_warning(format!(
                        "Model '{}' lists alias '{}' more than once",
                        id, alias
                    ));
                }
                Some(owner) => {
                    report.add_error(format!(
                        "Duplicate alias '{}' found in models: {} and {}",
                        alias, owner, id
                    ));
                }
                None => {
                    owners.insert(alias, id);
                }
            }
        }
    }

    owners
}

/// Members must exist, and a model belongs to at most one group
fn check_groups(
    groups: &IndexMap<String, Group>,
    declared: &HashSet<String>,
    report: &mut ValidationReport,
) {
    let mut membership: HashMap<&str, &str> = HashMap::new();
    let mut undefined = Vec::new();

    for (group_id, group) in groups {
        for member in &group.members {
            if !declared.contains(member) {
                undefined.push(format!(
                    "Group '{}' references undefined model '{}'",
                    group_id, member
                ));
            }
            if let Some(first) = membership.insert(member, group_id) {
                report.add_error(format!(
                    "Model '{}' is referenced in multiple groups: {} and {}",
                    member, first, group_id
                ));
            }
        }
    }

    if !undefined.is_empty() {
        let lines: Vec<String> = undefined.iter().map(|e| format!("  - {}", e)).collect();
        report.add_error(format!(
            "Undefined model references found:\n{}",
            lines.join("\n")
        ));
    }
}

fn is_known_model(name: &str, declared: &HashSet<String>, aliases: &HashMap<&str, &str>) -> bool {
    declared.contains(name) || aliases.contains_key(name)
}

fn check_preload(
    preload: &[String],
    declared: &HashSet<String>,
    aliases: &HashMap<&str, &str>,
    report: &mut ValidationReport,
) {
    for entry in preload {
        if !is_known_model(entry, declared, aliases) {
            report.add_error(format!(
                "Hooks preload references unknown model '{}'",
                entry
            ));
        }
    }
}

fn check_profiles(
    profiles: &IndexMap<String, Vec<String>>,
    declared: &HashSet<String>,
    aliases: &HashMap<&str, &str>,
    report: &mut ValidationReport,
) {
    for (profile, members) in profiles {
        for member in members {
            if !is_known_model(member, declared, aliases) {
                report.add_warning(format!(
                    "Profile '{}' references unknown model '{}'",
                    profile, member
                ));
            }
        }
    }
}

/// Unknown `${name}` references and malformed `${${` literals in model fields
fn check_macro_references(
    models: &IndexMap<String, ModelEntry>,
    macros: &MacroTable,
    report: &mut ValidationReport,
) {
    for (id, model) in models {
        for (field, value) in model.macro_fields() {
            if tokens::has_nested_literal(value) {
                report.add_error(format!(
                    "Nested macro detected in model '{}' field '{}': {}",
                    id, field, value
                ));
                continue;
            }

            let unknown: IndexSet<&str> = tokens::strict_references(value)
                .filter(|name| !tokens::is_reserved(name) && !macros.contains_key(*name))
                .collect();
            for name in unknown {
                let hint = suggest::closest(name, macros.keys().map(String::as_str))
                    .map(|s| format!(", did you mean '{}'?", s))
                    .unwrap_or_default();
                report.add_error(format!(
                    "Unknown macro '{}' in model '{}' field '{}'{}",
                    tokens::token(name),
                    id,
                    field,
                    hint
                ));
            }
        }
    }
}

/// A proxy URL may only use `${PORT}` when the launch command requests it
fn check_port_usage(models: &IndexMap<String, ModelEntry>, report: &mut ValidationReport) {
    let port = tokens::token("PORT");
    for (id, model) in models {
        if model.proxy().contains(&port) && !model.cmd.contains(&port) {
            report.add_error(format!(
                "Model '{}': proxy uses ${{PORT}} but cmd does not - ${{PORT}} is only available when used in cmd",
                id
            ));
        }
    }
}

/// Static cycle check over every declared macro, referenced or not
fn check_macro_cycles(macros: &MacroTable, report: &mut ValidationReport) {
    for (name, chain) in find_macro_cycles(macros) {
        report.add_error(format!(
            "Circular reference detected in macro '{}': {}",
            name,
            chain.join(" -> ")
        ));
    }
}

/// Every macro from which a cycle is reachable, with the first offending path found
pub fn find_macro_cycles(macros: &MacroTable) -> Vec<(String, Vec<String>)> {
    let graph: IndexMap<&str, Vec<&str>> = macros
        .iter()
        .map(|(name, value)| {
            let deps: IndexSet<&str> = tokens::strict_references(value)
                .filter(|dep| macros.contains_key(*dep))
                .collect();
            (name.as_str(), deps.into_iter().collect())
        })
        .collect();

    graph
        .keys()
        .filter_map(|root| {
            cycle_from(*root, &graph, &[])
                .map(|chain| (root.to_string(), chain.into_iter().map(str::to_string).collect()))
        })
        .collect()
}

/// Depth-first walk; `path` is local to each branch
fn cycle_from<'a>(
    name: &'a str,
    graph: &IndexMap<&'a str, Vec<&'a str>>,
    path: &[&'a str],
) -> Option<Vec<&'a str>> {
    let mut branch = path.to_vec();
    branch.push(name);
    if path.contains(&name) {
        return Some(branch);
    }

    graph
        .get(name)?
        .iter()
        .find_map(|dep| cycle_from(*dep, graph, &branch))
}

/// Declared macros nothing refers to
fn check_unused_macros(
    models: &IndexMap<String, ModelEntry>,
    macros: &MacroTable,
    report: &mut ValidationReport,
) {
    let mut referenced: HashSet<&str> = HashSet::new();
    for model in models.values() {
        for (_, value) in model.macro_fields() {
            referenced.extend(tokens::strict_references(value));
        }
    }
    for value in macros.values() {
        referenced.extend(tokens::strict_references(value));
    }

    for name in macros.keys() {
        if !referenced.contains(name.as_str()) {
            report.add_warning(format!("Macro '{}' is defined but never used", name));
        }
    }
}
