#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    SetMe,
    Me,
    /// `/stats <name…>`; the name is empty when no argument was given.
    Stats(String),
    Help,
    Cancel,
    Skip,
    Unknown(String),
}

impl Command {
    /// Recognises a slash command, dropping a trailing `@botname` on the
    /// command word. Plain text yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;
        let mut words = body.split_whitespace();
        let word = words.next().unwrap_or_default();
        let word = word.split_once('@').map_or(word, |(name, _)| name);
        let command = match word.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "setme" => Self::SetMe,
            "me" => Self::Me,
            "stats" => Self::Stats(words.collect::<Vec<_>>().join(" ")),
            "help" => Self::Help,
            "cancel" => Self::Cancel,
            "skip" => Self::Skip,
            _ => Self::Unknown(word.to_string()),
        };
        Some(command)
    }
}

pub const HELP_TEXT: &str = "Panduan singkat alur input:\n\
- /start: input pekerjaan baru (step-by-step)\n\
- /setme: set nama teknisi kamu (sekali saja)\n\
- /me: lihat stats kamu hari ini & bulan ini\n\
- /stats Nama Teknisi: lihat stats teknisi tertentu\n\
- /cancel: batalkan proses input\n\
- /skip: lewati keterangan";
