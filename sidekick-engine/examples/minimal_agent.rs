//! A minimal agent: joins a match, wanders toward whatever it last heard
//! about, and leaves when the referee calls time up.
//!
//! Run against a local simulation server:
//!
//! ```sh
//! cargo run --example minimal_agent -- MyTeam
//! ```

use sidekick_engine::{AgentLoop, ClientConfig, UdpTransport};
use sidekick_types::{Brain, Event, HeardSource, Intent, TeamName};

struct Wanderer;

impl Brain for Wanderer {
    async fn decide(&mut self, event: Event) -> Vec<Intent> {
        match event {
            Event::InitConfirmed { number, .. } => {
                // Line up behind the halfway line, spaced by uniform number.
                vec![Intent::Move {
                    x: -10.0,
                    y: f64::from(number) * 3.0 - 20.0,
                }]
            }
            Event::Visual { .. } => vec![Intent::Turn { moment: 20.0 }, Intent::Dash { power: 60.0 }],
            Event::Heard(heard) => {
                if heard.source == HeardSource::Referee && heard.text.starts_with("time_up") {
                    vec![Intent::Bye]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let team = std::env::args().nth(1).unwrap_or_else(|| "Wanderers".to_string());
    let team = TeamName::new(team)?;

    let transport = UdpTransport::bind().await?;
    let config = ClientConfig::new("127.0.0.1", 6000, team);

    let mut agent = AgentLoop::new(Wanderer, transport, config);
    agent.run().await?;
    Ok(())
}
