use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::api::HttpApi;
use crate::config::{normalize_base_url, Config};
use crate::error::ClientResult;
use crate::feed::action::FeedAction;
use crate::feed::controller::FeedController;
use crate::feed::state::{SearchScope, SortDirection, SortField};
use crate::view::notice::NoticeLevel;
use crate::view::{FeedView, HtmlDocument};

pub const HELP: &str = "\
commands:
  feed                          reload the feed
  more                          load the next page
  search [all|title|content] <query>
  clear                         clear the search
  sort <title|content|none> [asc|desc]
  post <title> | <content>
  edit <id>                     open the edit form of your post
  save <id> <title> | <content> save the open edit form
  cancel <id>                   close the edit form
  delete <id>
  like <id>
  comment <id> <text>
  expand <id>                   show or hide all comments
  register <username> <password>
  login <username> <password>
  logout
  base-url <url>                switch and remember the API address
  export <path>                 write the feed as an HTML page
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Feed,
    Search { scope: SearchScope, query: String },
    Clear,
    Sort {
        field: Option<SortField>,
        direction: SortDirection,
    },
    Post { title: String, content: String },
    Action(FeedAction),
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    BaseUrl(String),
    Export(PathBuf),
    Help,
    Quit,
}

/// Split `<title> | <content>`.
fn split_post(rest: &str) -> Result<(String, String), String> {
    match rest.split_once('|') {
        Some((title, content)) => Ok((title.trim().to_string(), content.trim().to_string())),
        None => Err("expected <title> | <content>".to_string()),
    }
}

/// Split off the first whitespace-separated word.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn require_id(rest: &str, usage: &str) -> Result<String, String> {
    let (id, _) = next_word(rest);
    if id.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(id.to_string())
    }
}

fn credentials(rest: &str, usage: &str) -> Result<(String, String), String> {
    let (username, rest) = next_word(rest);
    let (password, _) = next_word(rest);
    if username.is_empty() {
        return Err(format!("usage: {usage}"));
    }
    // Blank passwords go through so the controller can warn about them.
    Ok((username.to_string(), password.to_string()))
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let (word, rest) = next_word(line.trim());
    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "feed" | "reload" => Command::Feed,
        "more" => Command::Action(FeedAction::LoadMore),
        "search" => {
            let (first, remainder) = next_word(rest);
            let (scope, query) = match first.parse::<SearchScope>() {
                Ok(scope) => (scope, remainder),
                Err(_) => (SearchScope::All, rest),
            };
            Command::Search {
                scope,
                query: query.trim().to_string(),
            }
        }
        "clear" => Command::Clear,
        "sort" => {
            let (field, rest) = next_word(rest);
            let (direction, _) = next_word(rest);
            let field = match field.to_ascii_lowercase().as_str() {
                "" => return Err("usage: sort <title|content|none> [asc|desc]".into()),
                "none" => None,
                other => Some(other.parse::<SortField>()?),
            };
            let direction = if direction.is_empty() {
                SortDirection::default()
            } else {
                direction.parse::<SortDirection>()?
            };
            Command::Sort { field, direction }
        }
        "post" => {
            let (title, content) = split_post(rest)?;
            Command::Post { title, content }
        }
        "edit" => Command::Action(FeedAction::Edit {
            post_id: require_id(rest, "edit <id>")?,
        }),
        "save" => {
            let (post_id, rest) = next_word(rest);
            if post_id.is_empty() {
                return Err("usage: save <id> <title> | <content>".into());
            }
            let (title, content) = split_post(rest)?;
            Command::Action(FeedAction::SaveEdit {
                post_id: post_id.to_string(),
                title,
                content,
            })
        }
        "cancel" => Command::Action(FeedAction::CancelEdit {
            post_id: require_id(rest, "cancel <id>")?,
        }),
        "delete" => Command::Action(FeedAction::Delete {
            post_id: require_id(rest, "delete <id>")?,
        }),
        "like" => Command::Action(FeedAction::Like {
            post_id: require_id(rest, "like <id>")?,
        }),
        "comment" => {
            let (post_id, text) = next_word(rest);
            if post_id.is_empty() {
                return Err("usage: comment <id> <text>".into());
            }
            Command::Action(FeedAction::Comment {
                post_id: post_id.to_string(),
                text: text.to_string(),
            })
        }
        "expand" => Command::Action(FeedAction::ToggleComments {
            post_id: require_id(rest, "expand <id>")?,
        }),
        "register" => {
            let (username, password) = credentials(rest, "register <username> <password>")?;
            Command::Register { username, password }
        }
        "login" => {
            let (username, password) = credentials(rest, "login <username> <password>")?;
            Command::Login { username, password }
        }
        "logout" => Command::Logout,
        "base-url" => {
            let (url, _) = next_word(rest);
            if url.is_empty() {
                return Err("usage: base-url <url>".into());
            }
            Command::BaseUrl(url.to_string())
        }
        "export" => {
            let path = rest.trim();
            if path.is_empty() {
                return Err("usage: export <path>".into());
            }
            Command::Export(PathBuf::from(path))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end over one `FeedController`.
pub struct Shell {
    controller: FeedController<HttpApi, HtmlDocument>,
    config: Config,
    config_path: PathBuf,
}

impl Shell {
    pub fn new(config: Config, config_path: PathBuf) -> ClientResult<Self> {
        let api = HttpApi::new(&config.api.base_url)?;
        let document = HtmlDocument::new(Duration::from_millis(config.ui.notice_millis));
        let controller = FeedController::new(api, document, config.feed.page_size);
        Ok(Self {
            controller,
            config,
            config_path,
        })
    }

    pub fn controller(&self) -> &FeedController<HttpApi, HtmlDocument> {
        &self.controller
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        let c = &mut self.controller;
        match command {
            Command::Feed => {
                c.load_feed(false).await;
            }
            Command::Search { scope, query } => {
                c.search(&query, scope).await;
            }
            Command::Clear => {
                c.clear_search().await;
            }
            Command::Sort { field, direction } => {
                c.set_sort(field, direction).await;
            }
            Command::Post { title, content } => {
                c.submit_post(&title, &content).await;
            }
            Command::Action(action) => {
                c.dispatch(action).await;
            }
            Command::Register { username, password } => {
                c.register(&username, &password).await;
            }
            Command::Login { username, password } => {
                c.login(&username, &password).await;
            }
            Command::Logout => {
                c.logout().await;
            }
            Command::BaseUrl(url) => self.switch_base_url(&url).await,
            Command::Export(path) => {
                let html = self.controller.view().render_page();
                match tokio::fs::write(&path, html).await {
                    Ok(()) => self.controller.view_mut().notify(
                        NoticeLevel::Success,
                        &format!("Wrote {}", path.display()),
                    ),
                    Err(e) => {
                        tracing::error!("Export to {} failed: {}", path.display(), e);
                        self.controller
                            .view_mut()
                            .notify(NoticeLevel::Error, &format!("Export failed: {e}"));
                    }
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    async fn switch_base_url(&mut self, raw: &str) {
        let normalized = match normalize_base_url(raw) {
            Ok(url) => url,
            Err(e) => {
                self.controller
                    .view_mut()
                    .notify(NoticeLevel::Warning, &e.to_string());
                return;
            }
        };
        if let Err(e) = self.controller.api_mut().set_base_url(&normalized) {
            let message = e.user_message();
            self.controller
                .view_mut()
                .notify(NoticeLevel::Warning, &message);
            return;
        }

        self.config.api.base_url = normalized;
        if let Err(e) = self.config.save(&self.config_path) {
            tracing::warn!("Could not persist base URL: {}", e);
        }
        tracing::info!("API base URL is now {}", self.config.api.base_url);
        self.controller.load_feed(false).await;
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.controller.load_feed(false).await;
        stdout
            .write_all(self.controller.view().render_text().as_bytes())
            .await?;

        loop {
            stdout.write_all(b"\n> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    stdout.write_all(format!("{e}\n").as_bytes()).await?;
                    continue;
                }
            };

            let show_feed = !matches!(command, Command::Help | Command::Quit);
            if let Flow::Quit = self.execute(command).await {
                break;
            }
            if show_feed {
                stdout
                    .write_all(self.controller.view().render_text().as_bytes())
                    .await?;
            }
        }

        Ok(())
    }
}
