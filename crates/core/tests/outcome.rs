use codecommenter_core::outcome::CommentFailure;

#[test]
fn failure_kinds_are_stable_tags() {
    assert_eq!(CommentFailure::EmptyInput.kind(), "empty_input");
    assert_eq!(CommentFailure::EmptyModelResponse.kind(), "empty_model_response");
    assert_eq!(CommentFailure::Network { attempts: 3 }.kind(), "network_error");
    assert_eq!(
        CommentFailure::Unexpected { message: "boom".to_string() }.kind(),
        "unexpected_error"
    );
}

#[test]
fn user_messages_carry_attempts_and_diagnostics() {
    assert_eq!(
        CommentFailure::Network { attempts: 3 }.user_message(),
        "Failed to connect to the commenting service after 3 attempts."
    );
    assert!(CommentFailure::Unexpected { message: "bad json".to_string() }
        .user_message()
        .contains("bad json"));
    assert!(!CommentFailure::EmptyInput.user_message().is_empty());
    assert!(!CommentFailure::EmptyModelResponse.user_message().is_empty());
}
