use rclc_engine::router::{dispatch, dispatch_json, Reply, Request};
use rclc_engine::{CalculationRequest, Engine, EngineConfig, EvalErrorKind, Mode, NumberSystem};
use serde_json::Value;

fn calc(engine: &Engine, expr: &str, mode: Mode, ns: NumberSystem) -> String {
    engine
        .calculate(&CalculationRequest::new(expr, mode, ns))
        .formatted_result
}

fn json(engine: &Engine, text: &str) -> Value {
    serde_json::from_str(&dispatch_json(engine, text)).unwrap()
}

#[test]
fn results_in_every_mode() {
    let engine = Engine::default();
    let cases = [
        ("2 + 3 * 4", Mode::Basic, NumberSystem::Decimal, "14"),
        ("2**10", Mode::Scientific, NumberSystem::Decimal, "1024"),
        ("sqrt(2)", Mode::Scientific, NumberSystem::Decimal, "1.414213562"),
        ("1e3 / 8", Mode::Basic, NumberSystem::Decimal, "125"),
        ("1000 * (1 + 0.05) ** 2", Mode::Financial, NumberSystem::Decimal, "1102.5"),
        ("FF AND 0F", Mode::Programming, NumberSystem::Hexadecimal, "0F"),
        ("255", Mode::Programming, NumberSystem::Decimal, "255"),
        ("10", Mode::Programming, NumberSystem::Hexadecimal, "10"),
        ("7 + 1", Mode::Programming, NumberSystem::Octal, "10"),
        ("1111", Mode::Programming, NumberSystem::Binary, "1111"),
        ("0 - 1", Mode::Programming, NumberSystem::Binary, "11111111111111111111111111111111"),
    ];
    for (expr, mode, ns, want) in cases.iter() {
        assert_eq!(calc(&engine, expr, *mode, *ns), *want, "{} in {}/{}", expr, mode, ns);
    }
}

#[test]
fn failures_carry_their_kind() {
    let engine = Engine::default();
    let cases = [
        ("5/0", Mode::Basic, EvalErrorKind::DivideByZero),
        ("sqrt(-4)", Mode::Scientific, EvalErrorKind::DomainError),
        ("factorial(200)", Mode::Scientific, EvalErrorKind::Overflow),
        ("x + 1", Mode::Basic, EvalErrorKind::UnresolvedSymbol),
    ];
    for (expr, mode, kind) in cases.iter() {
        let (res, err) =
            engine.calculate_detailed(&CalculationRequest::new(expr, *mode, NumberSystem::Decimal));
        assert!(!res.is_success(), "{}", expr);
        assert_eq!(res.formatted_result, "Error");
        assert_eq!(err.and_then(|e| e.eval_kind()), Some(*kind), "{}", expr);
    }
}

#[test]
fn typed_dispatch() {
    let engine = Engine::default();
    let resp = dispatch(&engine, Request::Health);
    assert!(resp.success);
    assert!(matches!(resp.data, Some(Reply::Health(..))));

    let resp = dispatch(
        &engine,
        Request::DeleteHistory {
            session_id: "nobody".to_string(),
        },
    );
    match resp.data {
        Some(Reply::Cleared(c)) => assert_eq!(c.deleted_count, 0),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn json_session_workflow() {
    let engine = Engine::default();
    for expr in ["1 + 1", "2 * 3", "sqrt(-1)"].iter() {
        json(
            &engine,
            &format!(
                r#"{{"op":"calculate","expression":"{}","mode":"scientific","session_id":"s1"}}"#,
                expr
            ),
        );
    }
    json(&engine, r#"{"op":"calculate","expression":"1+1","session_id":"s2"}"#);

    let v = json(&engine, r#"{"op":"get_history","session_id":"s1"}"#);
    assert_eq!(v["success"], true);
    assert_eq!(v["data"]["count"], 3);
    let first = &v["data"]["history"][0];
    assert_eq!(first["expression"], "sqrt(-1)");
    assert_eq!(first["result"], "Error");
    assert!(first["error"].is_string());
    assert_eq!(v["data"]["history"][2]["formatted_result"], "2");
    // RFC 3339 timestamp, UUID id
    assert!(first["timestamp"].as_str().unwrap().contains('T'));
    assert_eq!(first["calculation_id"].as_str().unwrap().len(), 36);

    let v = json(
        &engine,
        r#"{"op":"get_history","session_id":"s1","filter":{"failures_only":true}}"#,
    );
    assert_eq!(v["data"]["count"], 1);

    let v = json(&engine, r#"{"op":"delete_history","session_id":"s1"}"#);
    assert_eq!(v["data"]["deleted_count"], 3);
    assert_eq!(json(&engine, r#"{"op":"get_history","session_id":"s1"}"#)["data"]["count"], 0);
    assert_eq!(json(&engine, r#"{"op":"get_history","session_id":"s2"}"#)["data"]["count"], 1);
}

#[test]
fn conversions_through_the_router() {
    let engine = Engine::default();
    let cases = [
        ("255", "decimal", "hexadecimal", "FF"),
        ("FF", "hexadecimal", "decimal", "255"),
        ("10", "octal", "decimal", "8"),
        ("1111", "binary", "decimal", "15"),
        ("-255", "10", "16", "-FF"),
    ];
    for (value, from, to, want) in cases.iter() {
        let v = json(
            &engine,
            &format!(
                r#"{{"op":"convert_number","value":"{}","from_base":"{}","to_base":"{}"}}"#,
                value, from, to
            ),
        );
        assert_eq!(v["data"]["converted"], *want, "{} {} -> {}", value, from, to);
        assert_eq!(v["data"]["original"], *value);
    }
}

#[test]
fn financial_formulas_through_the_router() {
    let engine = Engine::default();
    let v = json(
        &engine,
        r#"{"op":"financial_calculation","calculation_type":"compound_interest",
            "parameters":{"principal":1000,"rate":0.05,"time":2,"n":1}}"#,
    );
    assert_eq!(v["data"]["formatted_result"], "1102.50");

    let v = json(
        &engine,
        r#"{"op":"financial_calculation","calculation_type":"loan_payment",
            "parameters":{"principal":10000,"rate":0.05,"periods":12}}"#,
    );
    let payment = v["data"]["result"].as_f64().unwrap();
    assert!(payment > 1100.0 && payment < 1200.0, "{}", payment);

    let v = json(
        &engine,
        r#"{"op":"financial_calculation","calculation_type":"loan_payment",
            "parameters":{"principal":10000,"annual_rate":-0.05,"years":1}}"#,
    );
    assert_eq!(v["success"], false);
    assert_eq!(v["error"]["kind"], "InvalidParameters");
}

#[test]
fn configuration_shapes_results() {
    let config = EngineConfig::from_toml_str(
        "significant_digits = 4\ncurrency_decimals = 3\ndefault_session = \"main\"\n",
    )
    .unwrap();
    let engine = Engine::new(config);
    assert_eq!(calc(&engine, "1/3", Mode::Basic, NumberSystem::Decimal), "0.3333");
    assert_eq!(engine.history().len("main"), 1);

    let v = json(
        &engine,
        r#"{"op":"financial_calculation","calculation_type":"present_value",
            "parameters":{"future_value":1000,"annual_rate":0.05,"years":2}}"#,
    );
    assert_eq!(v["data"]["formatted_result"], "907.029");
}
