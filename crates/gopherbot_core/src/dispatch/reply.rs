//! Reply text rendering.
//!
//! Lists render one entity per line joined by `\n` with no trailing newline;
//! empty lists render a fixed sentence instead of an empty string.

use super::command::{group_subcommands, Group, Subcommand, ROUTING_LITERAL};
use crate::model::resource::Resource;
use crate::model::team::Team;

pub const NO_RESOURCES_FOUND: &str = "No resources found.";
pub const NO_TEAMS_FOUND: &str = "No teams found.";

/// `name<TAB>url` per resource.
pub fn resource_list(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return NO_RESOURCES_FOUND.to_string();
    }
    resources
        .iter()
        .map(|resource| format!("{}\t{}", resource.name, resource.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One team name per line.
pub fn team_list(teams: &[Team]) -> String {
    if teams.is_empty() {
        return NO_TEAMS_FOUND.to_string();
    }
    teams
        .iter()
        .map(|team| team.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn resource_created(name: &str, url: &str) -> String {
    format!("Create resource {name} with url {url}.")
}

pub fn resource_deleted(name: &str) -> String {
    format!("Delete resource {name}.")
}

pub fn resource_tagged(name: &str, team: &str) -> String {
    format!("Tag resource {name} with tag {team}.")
}

pub fn resource_detagged(name: &str, team: &str) -> String {
    format!("Detag resource {name} with tag {team}.")
}

pub fn team_created(name: &str) -> String {
    format!("Create tag {name}.")
}

pub fn too_many_parameters(subcommand: &Subcommand) -> String {
    format!("Too many parameters. Usage: {}", subcommand.usage_line())
}

pub fn too_few_parameters(subcommand: &Subcommand) -> String {
    format!("Too few parameters. Usage: {}", subcommand.usage_line())
}

/// Help text listing every subcommand of one group.
pub fn group_help(group: Group) -> String {
    let mut lines = vec![format!(
        "Usage: {ROUTING_LITERAL} {} <subcommand> [args...]",
        group.token()
    )];
    lines.extend(
        group_subcommands(group)
            .map(|subcommand| format!("  {} - {}", subcommand.usage_line(), subcommand.description)),
    );
    lines.join("\n")
}

/// Top-level help shown for a missing or unknown group.
pub fn general_help() -> String {
    [
        format!("Usage: {ROUTING_LITERAL} <res|tag> <subcommand> [args...]"),
        format!("  {ROUTING_LITERAL} res help - resource commands"),
        format!("  {ROUTING_LITERAL} tag help - tag commands"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{group_help, resource_list, team_list, NO_RESOURCES_FOUND, NO_TEAMS_FOUND};
    use crate::dispatch::command::Group;
    use crate::model::resource::Resource;
    use crate::model::team::Team;

    #[test]
    fn empty_lists_render_fixed_sentences() {
        assert_eq!(resource_list(&[]), NO_RESOURCES_FOUND);
        assert_eq!(team_list(&[]), NO_TEAMS_FOUND);
    }

    #[test]
    fn resource_list_is_tab_separated_without_trailing_newline() {
        let resources = vec![
            Resource {
                id: 1,
                name: "status".to_string(),
                url: "http://x".to_string(),
            },
            Resource {
                id: 2,
                name: "wiki".to_string(),
                url: "http://y".to_string(),
            },
        ];
        assert_eq!(resource_list(&resources), "status\thttp://x\nwiki\thttp://y");
    }

    #[test]
    fn team_list_renders_names_only() {
        let teams = vec![Team {
            id: 7,
            name: "sponsorship".to_string(),
        }];
        assert_eq!(team_list(&teams), "sponsorship");
    }

    #[test]
    fn group_help_lists_group_subcommands_only() {
        let help = group_help(Group::Tag);
        assert!(help.contains("/gopher tag ls"));
        assert!(help.contains("/gopher tag new <tag>"));
        assert!(!help.contains("detag"));
    }
}
