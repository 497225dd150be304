#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentFailure {
    EmptyInput,
    EmptyModelResponse,
    Network { attempts: u32 },
    Unexpected { message: String },
}

pub type CommentResult = Result<String, CommentFailure>;

impl CommentFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            CommentFailure::EmptyInput => "empty_input",
            CommentFailure::EmptyModelResponse => "empty_model_response",
            CommentFailure::Network { .. } => "network_error",
            CommentFailure::Unexpected { .. } => "unexpected_error",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CommentFailure::EmptyInput => "Please enter some code to comment.".to_string(),
            CommentFailure::EmptyModelResponse => {
                "The model returned an empty response. Please try again.".to_string()
            }
            CommentFailure::Network { attempts } => format!(
                "Failed to connect to the commenting service after {attempts} attempts."
            ),
            CommentFailure::Unexpected { message } => {
                format!("An unexpected error occurred: {message}")
            }
        }
    }
}
