use std::time::Duration;

use ureq::{config::ConfigBuilder, typestate::AgentScope, Agent};

pub const NET_CONNECT_TIMEOUT: Duration = Duration::from_millis(8 * 1000);

pub const NET_IO_TIMEOUT: Duration = Duration::from_millis(16 * 1000);

pub fn default_ureq_agent_builder(
    global_timeout: Duration,
    proxy_url: Option<&str>,
) -> ConfigBuilder<AgentScope> {
    let mut agent = Agent::config_builder()
        .timeout_global(Some(global_timeout))
        .timeout_connect(Some(NET_CONNECT_TIMEOUT))
        .timeout_recv_response(Some(NET_IO_TIMEOUT))
        .timeout_send_request(Some(NET_IO_TIMEOUT));

    if let Some(proxy_url) = proxy_url {
        let proxy = ureq::Proxy::new(proxy_url).ok();
        if proxy.is_none() {
            log::warn!("ignoring invalid proxy URL {:?}", proxy_url);
        }
        agent = agent.proxy(proxy);
    }

    agent
}
