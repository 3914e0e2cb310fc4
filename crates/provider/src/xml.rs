// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! XML navigation over provider replies.
//!
//! The provider's API links everything through elements whose `type`
//! attribute is a vendor MIME type; every agent navigates the same way,
//! so the search lives here and nowhere else.

use roxmltree::{Document, Node};

/// MIME types the agents search for.
pub mod mime {
    pub const VAPP: &str = "application/vnd.vmware.vcloud.vApp+xml";
    pub const CATALOGUE: &str = "application/vnd.vmware.vcloud.catalog+xml";
    pub const CATALOGUE_ITEM: &str = "application/vnd.vmware.vcloud.catalogItem+xml";
    pub const VAPP_TEMPLATE: &str = "application/vnd.vmware.vcloud.vAppTemplate+xml";
    pub const ORG: &str = "application/vnd.vmware.vcloud.org+xml";
    pub const VDC: &str = "application/vnd.vmware.vcloud.vdc+xml";
    pub const QUERY_RECORDS: &str = "application/vnd.vmware.vcloud.query.records+xml";
    pub const GUEST_CUSTOMIZATION: &str =
        "application/vnd.vmware.vcloud.guestCustomizationSection+xml";
    pub const NETWORK_CONNECTION: &str =
        "application/vnd.vmware.vcloud.networkConnectionSection+xml";
    pub const EDGE_GATEWAY_CONFIG: &str =
        "application/vnd.vmware.admin.edgeGatewayServiceConfiguration+xml";
    pub const ADMIN_NETWORK: &str = "application/vnd.vmware.admin.network+xml";
    pub const ADMIN_USER: &str = "application/vnd.vmware.admin.user+xml";
    pub const ADMIN_ROLE: &str = "application/vnd.vmware.admin.role+xml";
    pub const ADMIN_ORG: &str = "application/vnd.vmware.admin.organization+xml";
    pub const COMPOSE_PARAMS: &str =
        "application/vnd.vmware.vcloud.instantiateVAppTemplateParams+xml";
    pub const DEPLOY_PARAMS: &str = "application/vnd.vmware.vcloud.deployVAppParams+xml";
    pub const UNDEPLOY_PARAMS: &str = "application/vnd.vmware.vcloud.undeployVAppParams+xml";
}

/// Elements whose `type` attribute equals `mime_type` and whose
/// attributes contain every `(name, value)` pair in `filters`.
pub fn find_by_type<'a>(
    doc: &'a Document<'a>,
    mime_type: &'a str,
    filters: &'a [(&'a str, &'a str)],
) -> impl Iterator<Item = Node<'a, 'a>> + 'a {
    doc.descendants().filter(move |node| {
        node.attribute("type") == Some(mime_type)
            && filters.iter().all(|(name, value)| node.attribute(*name) == Some(*value))
    })
}

/// First match of [`find_by_type`].
pub fn first_by_type<'a>(
    doc: &'a Document<'a>,
    mime_type: &'a str,
    filters: &'a [(&'a str, &'a str)],
) -> Option<Node<'a, 'a>> {
    find_by_type(doc, mime_type, filters).next()
}

/// First element with the given local tag name.
pub fn first_tag<'a>(doc: &'a Document<'a>, tag: &str) -> Option<Node<'a, 'a>> {
    doc.descendants().find(|node| node.is_element() && node.tag_name().name() == tag)
}

/// First element carrying `name="value"`, regardless of type. The query
/// API answers record lists whose entries have no `type` attribute.
pub fn first_with_attr<'a>(
    doc: &'a Document<'a>,
    name: &str,
    value: &str,
) -> Option<Node<'a, 'a>> {
    doc.descendants().find(|node| node.is_element() && node.attribute(name) == Some(value))
}

/// Text of the first child element with the given local tag name.
pub fn child_text<'a>(node: Node<'a, 'a>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == tag)
        .and_then(|c| c.text())
}

/// Undo the entity escaping the provider applies to customisation
/// scripts before they are measured or inspected.
pub fn unescape_script(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#13;", "\n")
        .replace("&#37;", "%")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;
