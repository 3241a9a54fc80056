//! SOAP envelope construction and response decoding.

use sf_inspector_xml::{decode, encode, parse, XmlElement, XmlField, XmlMap, XmlValue, XSI_NAMESPACE};

use crate::error::{ApiFault, Error, ErrorKind, Result};
use crate::response::{http_status_line, sanitize_error_message};
use crate::wsdl::{SoapApi, WsdlDescriptor};

const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// A SOAP call: `method(args)` on one of the org's SOAP APIs.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapRequest {
    pub api: SoapApi,
    pub method: String,
    pub args: XmlValue,
    /// Extra `soapenv:Header` entries, merged after the session header.
    pub headers: XmlMap,
}

impl SoapRequest {
    /// Create a request with no extra headers.
    pub fn new(api: SoapApi, method: impl Into<String>, args: impl Into<XmlValue>) -> Self {
        Self {
            api,
            method: method.into(),
            args: args.into(),
            headers: XmlMap::new(),
        }
    }

    /// Add a header entry, e.g. `QueryOptions` or `AllOrNoneHeader`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<XmlValue>) -> Self {
        self.headers.insert(name, value.into());
        self
    }

    /// Replace all extra headers.
    pub fn with_headers(mut self, headers: XmlMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Serialize the full envelope for `request`.
pub fn build_envelope(wsdl: &WsdlDescriptor, session_id: &str, request: &SoapRequest) -> Result<String> {
    let met = wsdl.api.uses_met_prefix();
    let prefixed = |name: &str| {
        if met {
            format!("met:{name}")
        } else {
            name.to_string()
        }
    };

    let mut header = XmlMap::new().with(
        prefixed("SessionHeader"),
        XmlMap::new().with(prefixed("sessionId"), session_id),
    );
    header.extend(request.headers.clone());

    let envelope = XmlMap::new()
        .with("soapenv:Header", header)
        .with(
            "soapenv:Body",
            XmlMap::new().with(prefixed(&request.method), request.args.clone()),
        );

    let mut namespaces = format!(
        r#" xmlns:soapenv="{SOAP_ENVELOPE_NAMESPACE}" xmlns:xsi="{XSI_NAMESPACE}""#
    );
    if met {
        namespaces.push_str(&format!(r#" xmlns:met="{METADATA_NAMESPACE}""#));
    }
    namespaces.push_str(wsdl.target_namespaces);

    Ok(encode("soapenv:Envelope", &namespaces, &XmlValue::Complex(envelope))?)
}

/// Turn an HTTP exchange into the `result` of `<method>Response`.
///
/// A missing `result` is `One(Null)`; repeated `result` elements stay
/// `Many`.
pub fn parse_soap_response(status: u16, body: &str, method: &str) -> Result<XmlField> {
    if status != 200 {
        return Err(soap_error(status, body));
    }

    let root = parse(body).map_err(|e| invalid_response(status, body, e.to_string()))?;
    let response_tag = format!("{method}Response");
    let response = root
        .find(&response_tag)
        .ok_or_else(|| invalid_response(status, body, format!("missing <{response_tag}>")))?;

    let value = decode(response).map_err(|e| invalid_response(status, body, e.to_string()))?;
    Ok(match value {
        XmlValue::Complex(mut map) => map
            .remove("result")
            .unwrap_or(XmlField::One(XmlValue::Null)),
        _ => XmlField::One(XmlValue::Null),
    })
}

fn soap_error(status: u16, body: &str) -> Error {
    let fault = parse(body).ok().and_then(|root| fault_of(&root));

    let Some(fault) = fault else {
        return Error::new(ErrorKind::Protocol {
            status,
            message: http_status_line(status),
            errors: Vec::new(),
            raw_body: body.to_string(),
        });
    };

    let message = sanitize_error_message(&fault.message);
    if fault.code.ends_with("INVALID_SESSION_ID") {
        return Error::new(ErrorKind::Unauthorized(message));
    }

    Error::new(ErrorKind::Protocol {
        status,
        message,
        errors: vec![fault],
        raw_body: body.to_string(),
    })
}

fn fault_of(root: &XmlElement) -> Option<ApiFault> {
    let fault = root.find("Fault")?;
    let message = fault.find("faultstring")?.text_content();
    let code = fault
        .find("faultcode")
        .map(XmlElement::text_content)
        .unwrap_or_default();
    Some(ApiFault {
        code,
        message,
        fields: Vec::new(),
    })
}

fn invalid_response(status: u16, body: &str, reason: String) -> Error {
    Error::new(ErrorKind::Protocol {
        status,
        message: format!("Invalid SOAP response: {reason}"),
        errors: Vec::new(),
        raw_body: body.to_string(),
    })
}
