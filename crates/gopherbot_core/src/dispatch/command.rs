//! Command line tokenization and the subcommand table.

/// Literal every addressed message starts with.
pub const ROUTING_LITERAL: &str = "/gopher";

/// Routing group, the token right after the routing literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Resource operations.
    Res,
    /// Team (tag) operations.
    Tag,
}

impl Group {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "res" => Some(Self::Res),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Res => "res",
            Self::Tag => "tag",
        }
    }
}

/// Registry action a subcommand maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListResources,
    GetResource,
    CreateResource,
    DeleteResource,
    TagResource,
    DetagResource,
    ListTeams,
    CreateTeam,
    Help,
}

/// One row of the subcommand table.
#[derive(Debug)]
pub struct Subcommand {
    pub group: Group,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub action: Action,
    pub min_args: usize,
    pub max_args: usize,
    /// Argument placeholders shown after the subcommand in help output.
    pub usage: &'static str,
    pub description: &'static str,
}

impl Subcommand {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| *alias == name)
    }

    /// Full usage line, e.g. `/gopher res new <name> <url>`.
    pub fn usage_line(&self) -> String {
        let mut line = format!("{ROUTING_LITERAL} {} {}", self.group.token(), self.name);
        if !self.usage.is_empty() {
            line.push(' ');
            line.push_str(self.usage);
        }
        line
    }
}

/// All subcommands, in help display order.
static SUBCOMMANDS: &[Subcommand] = &[
    Subcommand {
        group: Group::Res,
        name: "ls",
        aliases: &["list"],
        action: Action::ListResources,
        min_args: 0,
        max_args: 1,
        usage: "[tag]",
        description: "list all resources, or those tagged with <tag>",
    },
    Subcommand {
        group: Group::Res,
        name: "get",
        aliases: &[],
        action: Action::GetResource,
        min_args: 1,
        max_args: 1,
        usage: "<name>",
        description: "show the url of a resource",
    },
    Subcommand {
        group: Group::Res,
        name: "new",
        aliases: &[],
        action: Action::CreateResource,
        min_args: 2,
        max_args: 2,
        usage: "<name> <url>",
        description: "register a resource",
    },
    Subcommand {
        group: Group::Res,
        name: "del",
        aliases: &[],
        action: Action::DeleteResource,
        min_args: 1,
        max_args: 1,
        usage: "<name>",
        description: "delete a resource and its tags",
    },
    Subcommand {
        group: Group::Res,
        name: "tag",
        aliases: &[],
        action: Action::TagResource,
        min_args: 2,
        max_args: 2,
        usage: "<name> <tag>",
        description: "tag a resource",
    },
    Subcommand {
        group: Group::Res,
        name: "detag",
        aliases: &[],
        action: Action::DetagResource,
        min_args: 2,
        max_args: 2,
        usage: "<name> <tag>",
        description: "remove a tag from a resource",
    },
    Subcommand {
        group: Group::Res,
        name: "help",
        aliases: &[],
        action: Action::Help,
        min_args: 0,
        max_args: usize::MAX,
        usage: "",
        description: "show this message",
    },
    Subcommand {
        group: Group::Tag,
        name: "ls",
        aliases: &["list"],
        action: Action::ListTeams,
        min_args: 0,
        max_args: 0,
        usage: "",
        description: "list all tags",
    },
    Subcommand {
        group: Group::Tag,
        name: "new",
        aliases: &[],
        action: Action::CreateTeam,
        min_args: 1,
        max_args: 1,
        usage: "<tag>",
        description: "register a tag",
    },
    Subcommand {
        group: Group::Tag,
        name: "help",
        aliases: &[],
        action: Action::Help,
        min_args: 0,
        max_args: usize::MAX,
        usage: "",
        description: "show this message",
    },
];

/// Finds a subcommand of `group` by name or alias.
pub fn find_subcommand(group: Group, name: &str) -> Option<&'static Subcommand> {
    SUBCOMMANDS
        .iter()
        .find(|subcommand| subcommand.group == group && subcommand.matches(name))
}

/// Subcommands of one group, in display order.
pub fn group_subcommands(group: Group) -> impl Iterator<Item = &'static Subcommand> {
    SUBCOMMANDS
        .iter()
        .filter(move |subcommand| subcommand.group == group)
}

/// Tokenized, addressed command line. Tokens exclude the routing literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    /// Splits `text` on whitespace and keeps it only when addressed to the
    /// bot.
    ///
    /// Accepts `/gopher` and Telegram's `/gopher@<bot>` form. When
    /// `bot_name` is set, the `@<bot>` suffix must match it
    /// (case-insensitive); otherwise any suffix is accepted.
    pub fn parse(text: &str, bot_name: Option<&str>) -> Option<Self> {
        Self::from_tokens(text.split_whitespace(), bot_name)
    }

    /// Same as [`CommandLine::parse`] for input that is already tokenized.
    pub fn from_tokens<I, S>(tokens: I, bot_name: Option<&str>) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = tokens.into_iter();
        let head = tokens.next()?;
        if !is_addressed(head.as_ref(), bot_name) {
            return None;
        }
        Some(Self {
            tokens: tokens.map(|token| token.as_ref().to_string()).collect(),
        })
    }

    /// Raw group token, if any.
    pub fn group(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Raw subcommand token, if any.
    pub fn subcommand(&self) -> Option<&str> {
        self.tokens.get(1).map(String::as_str)
    }

    /// Arguments after the subcommand.
    pub fn args(&self) -> &[String] {
        self.tokens.get(2..).unwrap_or(&[])
    }
}

fn is_addressed(head: &str, bot_name: Option<&str>) -> bool {
    let Some(rest) = head.strip_prefix(ROUTING_LITERAL) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    match (rest.strip_prefix('@'), bot_name) {
        (Some(addressee), Some(expected)) => addressee.eq_ignore_ascii_case(expected),
        (Some(addressee), None) => !addressee.is_empty(),
        (None, _) => false,
    }
}
