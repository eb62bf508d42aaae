//! Line-oriented user input mapped to UI actions.

use shared::domain::StudentId;

use crate::ui::{i18n::Language, shell::Route};

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Navigate(Route),
    Login { username: String, password: String },
    SetAnswer(String),
    SubmitGrade,
    Grade(String),
    Greet(String),
    Recommend(Option<StudentId>),
    Progress {
        student_id: StudentId,
        course: String,
        progress: f64,
    },
    Reload,
    ToggleTheme,
    SetLanguage(Language),
    ToggleMenu,
    SetApiUrl(String),
    Logout,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  go <home|login|dashboard|courses|tutor>
  login <user> <password>
  answer <text>          set the dashboard answer
  submit                 grade the current answer
  grade <text>           set and submit in one step
  greet <name>
  recommend [student-id]
  progress <student-id> <course...> <percent>
  reload                 refetch the current screen
  theme | lang <en|ar> | menu
  api <base-url>         point the session at another backend
  logout | help | quit";

impl UiAction {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "go" | "open" => rest
                .parse::<Route>()
                .map(Self::Navigate)
                .map_err(|err| err.to_string()),
            "login" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(username), Some(password)) => Ok(Self::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    }),
                    _ => Err("usage: login <user> <password>".to_string()),
                }
            }
            "answer" => Ok(Self::SetAnswer(rest.to_string())),
            "submit" => Ok(Self::SubmitGrade),
            "grade" => Ok(Self::Grade(rest.to_string())),
            "greet" => Ok(Self::Greet(rest.to_string())),
            "recommend" => {
                if rest.is_empty() {
                    Ok(Self::Recommend(None))
                } else {
                    parse_student(rest).map(|id| Self::Recommend(Some(id)))
                }
            }
            "progress" => parse_progress(rest),
            "reload" => Ok(Self::Reload),
            "theme" => Ok(Self::ToggleTheme),
            "lang" | "language" => rest.parse::<Language>().map(Self::SetLanguage),
            "menu" => Ok(Self::ToggleMenu),
            "api" if !rest.is_empty() => Ok(Self::SetApiUrl(rest.to_string())),
            "logout" => Ok(Self::Logout),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

fn parse_student(raw: &str) -> Result<StudentId, String> {
    raw.parse::<i64>()
        .map(StudentId)
        .map_err(|_| format!("invalid student id '{raw}'"))
}

fn parse_progress(rest: &str) -> Result<UiAction, String> {
    let usage = || "usage: progress <student-id> <course...> <percent>".to_string();
    let words: Vec<&str> = rest.split_whitespace().collect();
    let [student, course @ .., percent] = words.as_slice() else {
        return Err(usage());
    };
    if course.is_empty() {
        return Err(usage());
    }
    let progress = percent
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| format!("invalid progress '{percent}'"))?;
    Ok(UiAction::Progress {
        student_id: parse_student(student)?,
        course: course.join(" "),
        progress,
    })
}
