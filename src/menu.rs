// MENU: interactive session dispatching menu choices to the order and
// account operations. Every action finishes before the menu is shown again.

use crate::error::PromptError;
use crate::exec::Exchange;
use crate::order::{check_margin, prepare_order, MarginCheck, OrderRules};
use crate::ordering::{self, fetch_account, list_open_orders, list_recent_orders, submit};
use crate::prompt::{
    is_positive_decimal, is_valid_side, prompt_until_valid, prompt_until_valid_with, Console,
};
use crate::report;
use crate::symbols::SymbolResolver;
use crate::types::OrderType;
use tracing::info;

pub const GOODBYE: &str = "Exiting. See you soon!";

const MENU: &[&str] = &[
    "===========================================",
    "  Binance Futures Terminal",
    "===========================================",
    "[1] Place MARKET order",
    "[2] Place LIMIT order",
    "[3] Check orders",
    "[4] Cancel orders",
    "[5] Account info",
    "[0] Exit",
];

const SYMBOL_PROMPT: &str = "Symbol (e.g., BTCUSDT): ";
const SYMBOL_EXAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    MarketOrder,
    LimitOrder,
    CheckOrders,
    CancelOrders,
    AccountInfo,
    Exit,
}

impl MenuChoice {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" => Some(MenuChoice::MarketOrder),
            "2" => Some(MenuChoice::LimitOrder),
            "3" => Some(MenuChoice::CheckOrders),
            "4" => Some(MenuChoice::CancelOrders),
            "5" => Some(MenuChoice::AccountInfo),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub struct Session<'a, E: ?Sized, C: ?Sized> {
    exchange: &'a E,
    console: &'a mut C,
    rules: OrderRules,
    recent_limit: u32,
}

impl<'a, E, C> Session<'a, E, C>
where
    E: Exchange + ?Sized,
    C: Console + ?Sized,
{
    pub fn new(exchange: &'a E, console: &'a mut C, rules: OrderRules, recent_limit: u32) -> Self {
        Self {
            exchange,
            console,
            rules,
            recent_limit,
        }
    }

    /// Run until the user exits or input ends. Only console I/O failures escape.
    pub async fn run(&mut self) -> Result<(), PromptError> {
        loop {
            for line in MENU {
                self.console.say(line);
            }
            let Some(raw) = self.console.read_line("Select option: ").await? else {
                break;
            };
            let Some(choice) = MenuChoice::parse(&raw) else {
                self.console.say("Invalid choice. Try again.");
                continue;
            };
            if choice == MenuChoice::Exit {
                break;
            }
            info!(?choice, "MENU: action selected");
            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(PromptError::InputClosed) => break,
                Err(err) => return Err(err),
            }
        }
        self.console.say(GOODBYE);
        Ok(())
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> Result<(), PromptError> {
        match choice {
            MenuChoice::MarketOrder => self.place_order(OrderType::Market).await,
            MenuChoice::LimitOrder => self.place_order(OrderType::Limit).await,
            MenuChoice::CheckOrders => self.check_orders().await,
            MenuChoice::CancelOrders => self.cancel_orders().await,
            MenuChoice::AccountInfo => {
                self.account_info().await;
                Ok(())
            }
            MenuChoice::Exit => Ok(()),
        }
    }

    pub async fn place_order(&mut self, order_type: OrderType) -> Result<(), PromptError> {
        self.console.say(&format!("{order_type} order"));

        let resolver = SymbolResolver::fetch(self.exchange).await;
        if resolver.is_empty() {
            self.console.say(
                "Warning: could not load the symbol list (check your connection). Symbols are accepted as typed.",
            );
        } else {
            self.console.say(&format!(
                "{} tradable symbols, e.g. {}",
                resolver.len(),
                resolver.examples(SYMBOL_EXAMPLES).join(", ")
            ));
        }

        let symbol = prompt_until_valid_with(
            &mut *self.console,
            SYMBOL_PROMPT,
            |s| resolver.accepts(s),
            |s| resolver.correction_hint(s),
        )
        .await?;
        let side = prompt_until_valid(
            &mut *self.console,
            "Side (BUY/SELL): ",
            is_valid_side,
            "Enter BUY or SELL.",
        )
        .await?;
        let quantity = prompt_until_valid(
            &mut *self.console,
            "Quantity: ",
            is_positive_decimal,
            "Must be a positive number.",
        )
        .await?;
        let price = match order_type {
            OrderType::Limit => Some(
                prompt_until_valid(
                    &mut *self.console,
                    "Limit price: ",
                    is_positive_decimal,
                    "Must be a positive number.",
                )
                .await?,
            ),
            OrderType::Market => None,
        };

        let prepared = match prepare_order(
            self.exchange,
            &self.rules,
            &symbol,
            &side,
            order_type,
            &quantity,
            price.as_deref(),
        )
        .await
        {
            Ok(prepared) => prepared,
            Err(reason) => {
                self.console.say(&reason.guidance());
                return Ok(());
            }
        };
        if order_type == OrderType::Market {
            self.console.say(&format!(
                "Mark price {} -> order value ~${:.2}",
                prepared.effective_price.normalize(),
                prepared.notional()
            ));
        }

        match check_margin(
            self.exchange,
            &self.rules,
            &prepared.request,
            prepared.effective_price,
        )
        .await
        {
            Ok(MarginCheck::Sufficient { .. }) => {}
            Ok(MarginCheck::Skipped) => self
                .console
                .say("Margin check skipped: account data unavailable. The exchange will verify."),
            Err(reason) => {
                self.console.say(&reason.guidance());
                return Ok(());
            }
        }

        match submit(self.exchange, &prepared.request).await {
            Ok(ack) => self.console.say(&format!(
                "{} order placed: {} {} {} (id {}, status {})",
                order_type,
                prepared.request.side,
                prepared.request.quantity.normalize(),
                prepared.request.symbol,
                ack.order_id,
                ack.status
            )),
            Err(failure) => self.console.say(&failure.guidance()),
        }
        Ok(())
    }

    pub async fn check_orders(&mut self) -> Result<(), PromptError> {
        let symbol = self.ask(SYMBOL_PROMPT).await?;
        match list_open_orders(self.exchange, &symbol).await {
            Ok(orders) => self.say_lines(report::format_open_orders(
                &symbol.to_uppercase(),
                &orders,
            )),
            Err(err) => {
                self.console.say(&err.guidance());
                return Ok(());
            }
        }
        match list_recent_orders(self.exchange, &symbol, self.recent_limit).await {
            Ok(orders) => self.say_lines(report::format_recent_orders(
                &symbol.to_uppercase(),
                &orders,
                self.recent_limit as usize,
            )),
            Err(err) => self.console.say(&err.guidance()),
        }
        Ok(())
    }

    pub async fn cancel_orders(&mut self) -> Result<(), PromptError> {
        let symbol = self.ask(SYMBOL_PROMPT).await?;
        let open = match list_open_orders(self.exchange, &symbol).await {
            Ok(open) => open,
            Err(err) => {
                self.console.say(&err.guidance());
                return Ok(());
            }
        };
        if open.is_empty() {
            self.console.say("No open orders.");
            return Ok(());
        }
        self.say_lines(report::format_open_orders(&symbol.to_uppercase(), &open));

        let token = self.ask("Enter order ID or 'ALL': ").await?;
        match ordering::cancel(self.exchange, &symbol, &token).await {
            Ok(outcome) => self.console.say(&outcome.message()),
            Err(err) => self.console.say(&err.guidance()),
        }
        Ok(())
    }

    pub async fn account_info(&mut self) {
        match fetch_account(self.exchange).await {
            Ok(account) => {
                self.say_lines(report::format_balances(&account.balances));
                self.say_lines(report::format_positions(&account.positions));
            }
            Err(failure) => self.console.say(&failure.guidance()),
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        let line = self
            .console
            .read_line(prompt)
            .await?
            .ok_or(PromptError::InputClosed)?;
        Ok(line.trim().to_string())
    }

    fn say_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            self.console.say(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::MarketOrder));
        assert_eq!(MenuChoice::parse(" 5 "), Some(MenuChoice::AccountInfo));
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("9"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }
}
