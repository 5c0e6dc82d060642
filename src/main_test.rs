use super::*;

#[test]
fn parse_array_accepts_spaces_and_trailing_comma() {
    assert_eq!(parse_array("5, 3,8,").unwrap(), vec![5, 3, 8]);
}

#[test]
fn parse_array_rejects_words() {
    assert!(matches!(parse_array("5,x"), Err(CliError::InvalidArray(s)) if s == "x"));
}

#[test]
fn parse_open_reads_rank_and_difficulty() {
    let (rank, difficulty) = parse_open("1:advanced").unwrap();
    assert_eq!(rank, 1);
    assert_eq!(difficulty, Difficulty::Advanced);
}

#[test]
fn parse_open_rejects_missing_separator() {
    assert!(matches!(parse_open("1-beginner"), Err(CliError::InvalidOpen(_))));
}

#[test]
fn commands_update_host_context() {
    let ctx = Mutex::new(ContextSnapshot::default());
    let history = HistoryBackend::Memory(Arc::new(MemoryHistory::new()));

    assert!(run_command("algorithm Bubble Sort", &ctx, &history).unwrap());
    assert!(run_command("step 3", &ctx, &history).unwrap());
    assert!(run_command("array 5,3,8", &ctx, &history).unwrap());

    let ctx = ctx.into_inner().unwrap();
    assert_eq!(ctx.algorithm_text(), "Bubble Sort");
    assert_eq!(ctx.step_text(), "3");
    assert_eq!(ctx.array_text(), "5, 3, 8");
}

#[test]
fn quit_ends_chat() {
    let ctx = Mutex::new(ContextSnapshot::default());
    let history = HistoryBackend::Memory(Arc::new(MemoryHistory::new()));
    assert!(!run_command("quit", &ctx, &history).unwrap());
}

#[test]
fn cli_parses_chat_flags() {
    let cli = Cli::try_parse_from([
        "sortvision",
        "--base-url",
        "http://127.0.0.1:4000",
        "chat",
        "--algorithm",
        "Quick Sort",
        "--array",
        "3,1,2",
    ])
    .unwrap();
    assert_eq!(cli.base_url, "http://127.0.0.1:4000");
    let Command::Chat(args) = cli.command else {
        panic!("expected chat");
    };
    assert_eq!(args.algorithm.as_deref(), Some("Quick Sort"));
    assert_eq!(args.array.as_deref(), Some("3,1,2"));
}

#[test]
fn failed_and_ignored_sends_get_no_reply_label() {
    use sortvision::llm::FailureKind;

    assert_eq!(reply_label(&SendOutcome::Failed(FailureKind::Unreachable)), None);
    assert_eq!(reply_label(&SendOutcome::Ignored), None);
}

#[tokio::test(start_paused = true)]
async fn revealing_send_is_labelled_as_the_model() {
    let revealer = Revealer::new(
        RevealConfig::default(),
        Arc::new(ChatState::new()),
        Arc::new(TerminalBell),
        Arc::new(MemoryHistory::new()),
    );
    let outcome = SendOutcome::Revealing(revealer.start("q", "a"));

    assert_eq!(reply_label(&outcome), Some("AI"));
}
