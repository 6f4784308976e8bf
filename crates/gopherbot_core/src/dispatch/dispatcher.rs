//! Routes addressed command lines to registry operations.
//!
//! # Invariants
//! - Arity is checked before any registry call; a mismatch never touches
//!   the store.
//! - Recoverable registry errors are rendered verbatim as the reply.
//! - Only fatal store failures are returned as `Err`.

use super::command::{find_subcommand, Action, CommandLine, Group, Subcommand};
use super::reply;
use crate::repo::registry_repo::RegistryRepository;
use crate::service::registry_service::{RegistryError, RegistryResult, RegistryService};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure the dispatcher cannot turn into a reply.
#[derive(Debug)]
pub enum DispatchError {
    /// The registry store failed; the caller should stop serving commands.
    Store(RegistryError),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Stateless command dispatcher over a registry service.
pub struct Dispatcher<R: RegistryRepository> {
    registry: RegistryService<R>,
    bot_name: Option<String>,
}

impl<R: RegistryRepository> Dispatcher<R> {
    pub fn new(registry: RegistryService<R>) -> Self {
        Self {
            registry,
            bot_name: None,
        }
    }

    /// Restricts `/gopher@<bot>` mentions to this bot name.
    pub fn with_bot_name(mut self, bot_name: impl Into<String>) -> Self {
        self.bot_name = Some(bot_name.into());
        self
    }

    pub fn registry(&self) -> &RegistryService<R> {
        &self.registry
    }

    pub fn into_registry(self) -> RegistryService<R> {
        self.registry
    }

    /// Handles one inbound message.
    ///
    /// Returns `Ok(None)` for messages not addressed to the bot.
    pub fn handle_text(&mut self, text: &str) -> DispatchResult<Option<String>> {
        let Some(line) = CommandLine::parse(text, self.bot_name.as_deref()) else {
            return Ok(None);
        };
        self.dispatch(&line).map(Some)
    }

    /// Produces the reply for one addressed command line.
    pub fn dispatch(&mut self, line: &CommandLine) -> DispatchResult<String> {
        let Some(group) = line.group().and_then(Group::parse) else {
            return Ok(reply::general_help());
        };
        let Some(subcommand) = line
            .subcommand()
            .and_then(|name| find_subcommand(group, name))
        else {
            return Ok(reply::group_help(group));
        };

        let args = line.args();
        debug!(
            "event=dispatch module=dispatch status=start group={} subcommand={} args={}",
            group.token(),
            subcommand.name,
            args.len()
        );

        if let Some(message) = check_arity(subcommand, args.len()) {
            debug!(
                "event=dispatch module=dispatch status=rejected reason=arity subcommand={}",
                subcommand.name
            );
            return Ok(message);
        }

        match self.run(subcommand, args) {
            Ok(message) => Ok(message),
            Err(err) if err.is_fatal() => {
                error!(
                    "event=dispatch module=dispatch status=error subcommand={} error={}",
                    subcommand.name, err
                );
                Err(DispatchError::Store(err))
            }
            Err(err) => Ok(err.to_string()),
        }
    }

    fn run(&mut self, subcommand: &Subcommand, args: &[String]) -> RegistryResult<String> {
        let arg = |index: usize| args.get(index).map(String::as_str).unwrap_or_default();

        match subcommand.action {
            Action::ListResources => {
                let resources = match args.first() {
                    Some(team) => self.registry.query_resources_by_team(team)?,
                    None => self.registry.list_resources()?,
                };
                Ok(reply::resource_list(&resources))
            }
            Action::GetResource => Ok(self.registry.get_resource(arg(0))?.url),
            Action::CreateResource => {
                self.registry.create_resource(arg(0), arg(1))?;
                Ok(reply::resource_created(arg(0), arg(1)))
            }
            Action::DeleteResource => {
                self.registry.delete_resource(arg(0))?;
                Ok(reply::resource_deleted(arg(0)))
            }
            Action::TagResource => {
                self.registry.register_resource(arg(0), arg(1))?;
                Ok(reply::resource_tagged(arg(0), arg(1)))
            }
            Action::DetagResource => {
                self.registry.deregister_resource(arg(0), arg(1))?;
                Ok(reply::resource_detagged(arg(0), arg(1)))
            }
            Action::ListTeams => Ok(reply::team_list(&self.registry.list_teams()?)),
            Action::CreateTeam => {
                self.registry.create_team(arg(0))?;
                Ok(reply::team_created(arg(0)))
            }
            Action::Help => Ok(reply::group_help(subcommand.group)),
        }
    }
}

fn check_arity(subcommand: &Subcommand, given: usize) -> Option<String> {
    if given > subcommand.max_args {
        Some(reply::too_many_parameters(subcommand))
    } else if given < subcommand.min_args {
        Some(reply::too_few_parameters(subcommand))
    } else {
        None
    }
}
