// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendered POST bodies: vApp composition, NAT rules, firewall rule.

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("template: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("render: {0}")]
    Render(#[from] handlebars::RenderError),
}

const COMPOSE_VAPP: &str = r#"<InstantiateVAppTemplateParams xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:ovf="http://schemas.dmtf.org/ovf/envelope/1" name="{{appliance.name}}" deploy="false" powerOn="false">
  <Description>{{appliance.description}}</Description>
  <InstantiationParams>
    <NetworkConfigSection>
      <ovf:Info>Configuration parameters for logical networks</ovf:Info>
      <NetworkConfig networkName="{{network.name}}">
        <Configuration>
          <ParentNetwork href="{{network.href}}"/>
          <FenceMode>bridged</FenceMode>
        </Configuration>
      </NetworkConfig>
    </NetworkConfigSection>
  </InstantiationParams>
  <Source href="{{template.href}}" name="{{template.name}}"/>
</InstantiateVAppTemplateParams>
"#;

const NAT_RULES: &str = r#"<EdgeGatewayServiceConfiguration xmlns="http://www.vmware.com/vcloud/v1.5">
  <NatService>
    <IsEnabled>true</IsEnabled>
    <NatRule>
      <RuleType>DNAT</RuleType>
      <IsEnabled>true</IsEnabled>
      <GatewayNatRule>
        <Interface href="{{interface}}"/>
        <OriginalIp>{{rx}}</OriginalIp>
        <TranslatedIp>{{tx}}</TranslatedIp>
        <Protocol>any</Protocol>
      </GatewayNatRule>
    </NatRule>
    <NatRule>
      <RuleType>SNAT</RuleType>
      <IsEnabled>true</IsEnabled>
      <GatewayNatRule>
        <Interface href="{{interface}}"/>
        <OriginalIp>{{tx}}</OriginalIp>
        <TranslatedIp>{{rx}}</TranslatedIp>
        <Protocol>any</Protocol>
      </GatewayNatRule>
    </NatRule>
  </NatService>
</EdgeGatewayServiceConfiguration>
"#;

const FIREWALL_RULE: &str = r#"<EdgeGatewayServiceConfiguration xmlns="http://www.vmware.com/vcloud/v1.5">
  <FirewallService>
    <IsEnabled>true</IsEnabled>
    <FirewallRule>
      <IsEnabled>true</IsEnabled>
      <Description>{{description}}</Description>
      <Policy>allow</Policy>
      <Protocols>
        <Any>true</Any>
      </Protocols>
      <DestinationPortRange>Any</DestinationPortRange>
      <DestinationIp>{{ip}}</DestinationIp>
      <SourcePortRange>Any</SourcePortRange>
      <SourceIp>Any</SourceIp>
    </FirewallRule>
  </FirewallService>
</EdgeGatewayServiceConfiguration>
"#;

#[derive(Debug, Serialize)]
pub struct ComposeParams<'a> {
    pub appliance: NameDescription<'a>,
    pub network: NameHref<'a>,
    pub template: NameHref<'a>,
}

#[derive(Debug, Serialize)]
pub struct NameDescription<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NameHref<'a> {
    pub name: &'a str,
    pub href: &'a str,
}

/// A DNAT/SNAT pair: `rx` is the public address packets arrive on,
/// `tx` the private address they are translated to.
#[derive(Debug, Serialize)]
pub struct NatParams<'a> {
    pub interface: &'a str,
    pub rx: &'a str,
    pub tx: &'a str,
}

#[derive(Debug, Serialize)]
pub struct FirewallParams<'a> {
    pub description: &'a str,
    pub ip: &'a str,
}

/// Registry of the three payload templates.
pub struct Payloads {
    registry: Handlebars<'static>,
}

impl Payloads {
    pub fn new() -> Result<Self, PayloadError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("compose_vapp", COMPOSE_VAPP)
            .map_err(Box::new)?;
        registry.register_template_string("nat_rules", NAT_RULES).map_err(Box::new)?;
        registry
            .register_template_string("firewall_rule", FIREWALL_RULE)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    pub fn compose_vapp(&self, params: &ComposeParams<'_>) -> Result<String, PayloadError> {
        Ok(self.registry.render("compose_vapp", params)?)
    }

    pub fn nat_rules(&self, params: &NatParams<'_>) -> Result<String, PayloadError> {
        Ok(self.registry.render("nat_rules", params)?)
    }

    pub fn firewall_rule(&self, params: &FirewallParams<'_>) -> Result<String, PayloadError> {
        Ok(self.registry.render("firewall_rule", params)?)
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
