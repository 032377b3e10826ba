use logdrift::patterns::postprocess_template;

#[test]
fn plain_templates_are_unchanged() {
    assert_eq!(postprocess_template("User <NUM> logged in"), "User <NUM> logged in");
    assert_eq!(postprocess_template(""), "");
}

#[test]
fn repeated_placeholders_collapse() {
    assert_eq!(postprocess_template("<NUM> <NUM> <NUM> items"), "<NUM> items");
    assert_eq!(postprocess_template("moved <*> <*> to <IP>"), "moved <*> to <IP>");
    assert_eq!(postprocess_template("<NUM>, <NUM>"), "<NUM>, <NUM>");
}

#[test]
fn numeric_runs_fold_into_time_and_date() {
    assert_eq!(postprocess_template("at <NUM>:<NUM>:<NUM>"), "at <TIME>");
    assert_eq!(postprocess_template("at <NUM>:<NUM>:<NUM>.<NUM>"), "at <TIME>");
    assert_eq!(postprocess_template("on <NUM>-<NUM>-<NUM>"), "on <DATE>");
}

#[test]
fn bracketed_timestamps_fold() {
    assert_eq!(
        postprocess_template("[<NUM>-<NUM>-<NUM>T<NUM>:<NUM>:<NUM>+<NUM>:<NUM>] app.ERROR"),
        "[<TIMESTAMP>] app.ERROR"
    );
    assert_eq!(
        postprocess_template("[<NUM>-<NUM>-<NUM> <NUM>:<NUM>:<NUM>] worker"),
        "[<TIMESTAMP>] worker"
    );
}

#[test]
fn folded_repeats_collapse_too() {
    assert_eq!(postprocess_template("<NUM>:<NUM>:<NUM> <NUM>:<NUM>:<NUM> tick"), "<TIME> tick");
}

#[test]
fn postprocessing_is_idempotent() {
    let templates = [
        "<NUM> <NUM> <NUM> items",
        "[<NUM>-<NUM>-<NUM> <NUM>:<NUM>:<NUM>] worker <*> <*>",
        "at <NUM>:<NUM>:<NUM>.<NUM> from <IP> <IP>",
        "GET /x?PARAMS HTTP/<NUM>.<NUM>",
    ];
    for t in templates {
        let once = postprocess_template(t);
        assert_eq!(postprocess_template(&once), once, "not idempotent for {t}");
    }
}
