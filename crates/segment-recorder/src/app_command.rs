/// Commands read from the terminal and handled by the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording, or resume a paused one.
    StartRecording,
    /// Pause the current recording.
    PauseRecording,
    /// Stop and produce the final movie.
    StopRecording,
    /// Switch between front and rear camera.
    SwapCamera,
    /// Print the recorder status.
    Status,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Parses one input line. Case and surrounding whitespace are ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "resume" | "r" => Some(AppCommand::StartRecording),
            "pause" | "p" => Some(AppCommand::PauseRecording),
            "stop" | "s" => Some(AppCommand::StopRecording),
            "swap" | "w" => Some(AppCommand::SwapCamera),
            "status" | "?" => Some(AppCommand::Status),
            "quit" | "exit" | "q" => Some(AppCommand::Shutdown),
            _ => None,
        }
    }
}
