//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SignIn { .. } => "sign_in",
            BackendCommand::SignUp { .. } => "sign_up",
            BackendCommand::SignOut => "sign_out",
        }
    }
}
