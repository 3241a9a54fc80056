//! SOAP service descriptors.

/// The SOAP APIs an org exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapApi {
    /// Strongly typed, org-specific WSDL.
    Enterprise,
    /// Loosely typed WSDL (`sObject` with `xsi:type`).
    Partner,
    /// Apex (anonymous execution, compile, run tests).
    Apex,
    Metadata,
    Tooling,
}

/// Where a SOAP API lives and which namespaces its envelopes declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsdlDescriptor {
    pub api: SoapApi,
    /// `/services/Soap/<letter>/<version>`
    pub service_path: String,
    /// Raw namespace attributes appended to the envelope start tag.
    pub target_namespaces: &'static str,
}

impl SoapApi {
    /// All APIs, in a stable order.
    pub const ALL: [SoapApi; 5] = [
        SoapApi::Enterprise,
        SoapApi::Partner,
        SoapApi::Apex,
        SoapApi::Metadata,
        SoapApi::Tooling,
    ];

    /// The endpoint letter under `/services/Soap/`.
    pub fn letter(&self) -> char {
        match self {
            SoapApi::Enterprise => 'c',
            SoapApi::Partner => 'u',
            SoapApi::Apex => 's',
            SoapApi::Metadata => 'm',
            SoapApi::Tooling => 'T',
        }
    }

    /// Namespace attributes for envelopes of this API.
    pub fn target_namespaces(&self) -> &'static str {
        match self {
            SoapApi::Enterprise => {
                r#" xmlns="urn:enterprise.soap.sforce.com" xmlns:sf="urn:sobject.enterprise.soap.sforce.com""#
            }
            SoapApi::Partner => {
                r#" xmlns="urn:partner.soap.sforce.com" xmlns:sf="urn:sobject.partner.soap.sforce.com""#
            }
            SoapApi::Apex => r#" xmlns="http://soap.sforce.com/2006/08/apex""#,
            SoapApi::Metadata => r#" xmlns="http://soap.sforce.com/2006/04/metadata""#,
            SoapApi::Tooling => {
                r#" xmlns="urn:tooling.soap.sforce.com" xmlns:sf="urn:sobject.tooling.soap.sforce.com" xmlns:mns="urn:metadata.tooling.soap.sforce.com""#
            }
        }
    }

    /// The Metadata API prefixes its header and body elements with `met:`.
    pub fn uses_met_prefix(&self) -> bool {
        matches!(self, SoapApi::Metadata)
    }

    /// Descriptor for a given API version.
    pub fn wsdl(&self, api_version: &str) -> WsdlDescriptor {
        WsdlDescriptor {
            api: *self,
            service_path: format!("/services/Soap/{}/{}", self.letter(), api_version),
            target_namespaces: self.target_namespaces(),
        }
    }
}

impl std::fmt::Display for SoapApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SoapApi::Enterprise => "Enterprise",
            SoapApi::Partner => "Partner",
            SoapApi::Apex => "Apex",
            SoapApi::Metadata => "Metadata",
            SoapApi::Tooling => "Tooling",
        };
        f.write_str(name)
    }
}
