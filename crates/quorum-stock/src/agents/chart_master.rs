//! Technical chart analysis agent

use super::{bracket_confidence, money, number, AgentReport, AnalysisInput, Analyst};
use crate::config::ModelTier;
use crate::model::TechnicalSnapshot;
use chrono::Utc;
use std::collections::HashMap;

/// Full-indicator technical analyst (fast tier)
pub struct ChartMaster;

/// Label the MACD state from line/signal/histogram
fn macd_label(tech: &TechnicalSnapshot) -> &'static str {
    match (tech.macd_line, tech.macd_signal, tech.macd_histogram) {
        (Some(line), Some(signal), Some(histogram)) => {
            if line > signal && histogram > 0.0 {
                "Bullish Crossover"
            } else if line < signal && histogram < 0.0 {
                "Bearish Crossover"
            } else if histogram > 0.0 {
                "Bullish Momentum"
            } else {
                "Bearish Momentum"
            }
        }
        _ => "Neutral",
    }
}

/// Position of price within the Bollinger bands
fn band_label(tech: &TechnicalSnapshot) -> &'static str {
    match (tech.bb_upper, tech.bb_lower) {
        (Some(upper), Some(lower)) => {
            let range = upper - lower;
            if tech.current > upper - range * 0.1 {
                "Near Upper Band (Overbought)"
            } else if tech.current < lower + range * 0.1 {
                "Near Lower Band (Oversold)"
            } else if range < 5.0 {
                "Squeeze (Volatility Breakout Potential)"
            } else {
                "Middle"
            }
        }
        _ => "Middle",
    }
}

/// Conviction from volume vs its 20-day average
fn volume_label(tech: &TechnicalSnapshot) -> &'static str {
    match (tech.volume, tech.volume_sma20) {
        (Some(volume), Some(average)) => {
            let volume = volume as f64;
            if volume > average * 1.5 {
                "High Volume (Strong Conviction)"
            } else if volume < average * 0.5 {
                "Low Volume (Weak Conviction)"
            } else {
                "Average"
            }
        }
        _ => "Average",
    }
}

fn stochastic_label(tech: &TechnicalSnapshot) -> &'static str {
    match tech.stoch_rsi {
        Some(stoch) if stoch > 80.0 => "Overbought",
        Some(stoch) if stoch < 20.0 => "Oversold",
        Some(_) => "Neutral",
        None => "Neutral",
    }
}

fn momentum_label(tech: &TechnicalSnapshot, macd: &str) -> &'static str {
    if tech.rsi > 50.0 && macd.starts_with("Bullish") {
        "Bullish"
    } else if tech.rsi < 50.0 && macd.starts_with("Bearish") {
        "Bearish"
    } else {
        "Neutral"
    }
}

fn volatility_label(tech: &TechnicalSnapshot) -> &'static str {
    match tech.bb_width {
        Some(width) if width > 15.0 => "High",
        Some(width) if width < 5.0 => "Low",
        Some(_) => "Normal",
        None => "Normal",
    }
}

impl Analyst for ChartMaster {
    fn name(&self) -> &'static str {
        "ChartMaster"
    }

    fn tier(&self) -> ModelTier {
        ModelTier::Fast
    }

    fn build_prompt(&self, input: &AnalysisInput) -> String {
        let tech = &input.technicals;
        let sym = &tech.symbol;

        let macd = macd_label(tech);
        let bands = band_label(tech);
        let volume = volume_label(tech);
        let stochastic = stochastic_label(tech);
        let momentum = momentum_label(tech, macd);
        let volatility = volatility_label(tech);

        let atr = tech.atr.unwrap_or(0.0);
        let entry_low = tech.support.max(tech.bb_lower.unwrap_or(tech.support));
        let entry_high = tech.resistance.min(tech.bb_upper.unwrap_or(tech.resistance));

        format!(
            r"ChartMaster Technical Analysis for {ticker}

=== PRICE ACTION ===
- Current Price: {sym}{current:.2} {currency}
- Support: {sym}{support:.2}
- Resistance: {sym}{resistance:.2}
- Daily Range (ATR): {atr_fmt}

=== MOVING AVERAGES ===
- SMA20: {sym}{sma20:.2} | Price vs SMA20: {vs_sma20}
- SMA50: {sym}{sma50:.2} | Price vs SMA50: {vs_sma50}
- Trend: {trend}

=== MOMENTUM INDICATORS ===
- RSI (14): {rsi:.1} | {rsi_label}
- Stochastic RSI: {stoch_fmt} | {stochastic}
- MACD Line: {macd_line} | Signal: {macd_signal} | Histogram: {macd_histogram}
- MACD Signal: {macd}

=== VOLATILITY INDICATORS ===
- Bollinger Bands:
  - Upper: {bb_upper}
  - Middle: {bb_middle}
  - Lower: {bb_lower}
  - Width: {bb_width}% | Position: {bands}
- ATR (14): {atr_fmt}

=== VOLUME ANALYSIS ===
- Current Volume: {volume_fmt}
- 20-Day Avg Volume: {volume_sma_fmt}
- Volume Signal: {volume}

=== QUESTION ===
{question}

=== FORMAT EXACTLY ===
[TIMESTAMP] {timestamp}
[SUMMARY] One-line technical bias with key catalyst
[KEY_SIGNALS]
- Trend: {trend}
- Momentum: {momentum}
- Volatility: {volatility}
- Volume: {volume}
[TRADE_IDEAS]
- Entry Zone: {sym}{entry_low:.2} - {sym}{entry_high:.2}
- Stop Loss: {sym}{stop_loss:.2}
- Target: {sym}{target:.2}
[CONFIDENCE] 1-10",
            ticker = input.ticker,
            current = tech.current,
            currency = tech.currency,
            support = tech.support,
            resistance = tech.resistance,
            atr_fmt = money(sym, tech.atr),
            sma20 = tech.sma20,
            vs_sma20 = if tech.current > tech.sma20 { "Above" } else { "Below" },
            sma50 = tech.sma50,
            vs_sma50 = if tech.current > tech.sma50 { "Above" } else { "Below" },
            trend = tech.trend,
            rsi = tech.rsi,
            rsi_label = if tech.rsi > 70.0 {
                "Overbought"
            } else if tech.rsi < 30.0 {
                "Oversold"
            } else {
                "Neutral"
            },
            stoch_fmt = number(tech.stoch_rsi, 1),
            macd_line = number(tech.macd_line, 3),
            macd_signal = number(tech.macd_signal, 3),
            macd_histogram = number(tech.macd_histogram, 3),
            bb_upper = money(sym, tech.bb_upper),
            bb_middle = money(sym, tech.bb_middle),
            bb_lower = money(sym, tech.bb_lower),
            bb_width = number(tech.bb_width, 1),
            volume_fmt = tech
                .volume
                .map_or_else(|| "N/A".to_string(), |v| v.to_string()),
            volume_sma_fmt = number(tech.volume_sma20, 0),
            question = input.question,
            timestamp = Utc::now().format("%Y-%m-%d %H:%M UTC"),
            stop_loss = tech.support - atr,
            target = tech.resistance + atr,
        )
    }

    fn parse_response(&self, response: &str) -> AgentReport {
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "technical".to_string());
        metadata.insert("indicators".to_string(), "MACD,BB,RSI,Volume".to_string());

        AgentReport {
            agent_name: self.name().to_string(),
            content: response.to_string(),
            confidence: bracket_confidence(response),
            metadata,
            success: true,
        }
    }
}
