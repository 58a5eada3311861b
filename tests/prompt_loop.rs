// Re-prompt loop with the shared symbol resolver

mod helpers;

use futures_terminal::error::PromptError;
use futures_terminal::prompt::{
    is_positive_decimal, prompt_until_valid, prompt_until_valid_with, ScriptedConsole,
};
use futures_terminal::symbols::{list_tradable_symbols, SymbolResolver};
use helpers::{Fail, FakeExchange};

#[tokio::test]
async fn test_rejects_until_positive_number() {
    let mut console = ScriptedConsole::new(["abc", "-1", "5"]);
    let value = prompt_until_valid(
        &mut console,
        "Quantity: ",
        is_positive_decimal,
        "Must be a positive number.",
    )
    .await
    .unwrap();
    assert_eq!(value, "5");
    assert_eq!(console.output.len(), 2);
    assert_eq!(console.remaining(), 0);
}

#[tokio::test]
async fn test_symbol_prompt_suggests_correction() {
    let exchange = FakeExchange::new();
    let resolver = SymbolResolver::fetch(&exchange).await;
    assert_eq!(resolver.len(), 2);

    let mut console = ScriptedConsole::new(["BTCUSD", "OLDUSDT", "btcusdt"]);
    let symbol = prompt_until_valid_with(
        &mut console,
        "Symbol: ",
        |s| resolver.accepts(s),
        |s| resolver.correction_hint(s),
    )
    .await
    .unwrap();

    assert_eq!(symbol, "btcusdt");
    assert_eq!(console.output[0], "Invalid symbol 'BTCUSD'. Did you mean BTCUSDT?");
    // not trading, so not offered as-is
    assert!(console.output[1].starts_with("Invalid symbol 'OLDUSDT'"));
}

#[tokio::test]
async fn test_symbol_list_failure_falls_back_to_free_form() {
    let exchange = FakeExchange::new().failing("exchange_symbols", Fail::Transport);
    assert!(list_tradable_symbols(&exchange).await.is_empty());

    let resolver = SymbolResolver::fetch(&exchange).await;
    let mut console = ScriptedConsole::new(["x!", "NEWUSDT"]);
    let symbol = prompt_until_valid_with(
        &mut console,
        "Symbol: ",
        |s| resolver.accepts(s),
        |s| resolver.correction_hint(s),
    )
    .await
    .unwrap();
    assert_eq!(symbol, "NEWUSDT");
    assert_eq!(console.output.len(), 1);
}

#[tokio::test]
async fn test_closed_input_stops_the_loop() {
    let mut console = ScriptedConsole::new(["0", "-3"]);
    let err = prompt_until_valid(&mut console, "Price: ", is_positive_decimal, "positive only")
        .await
        .unwrap_err();
    assert!(matches!(err, PromptError::InputClosed));
    assert_eq!(console.prompts.len(), 3);
}
