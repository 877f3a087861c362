//! Log classifications: the closed set of loggable event categories.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reserved code terminating a raw classification list.
pub const END_OF_LIST: i32 = 0;

/// Subsystem a classification belongs to. Encoded in the upper 16 bits of
/// a classification's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Facility {
    CoreHttp = 1,
    IotMqtt = 2,
    Iot = 3,
    Hfsm = 4,
}

const fn code(facility: Facility, ordinal: i32) -> i32 {
    ((facility as i32) << 16) | ordinal
}

/// Category of a loggable event.
///
/// Adding a tag means adding a variant here and to [`Classification::ALL`];
/// codes of existing tags never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Classification {
    /// An outgoing HTTP request.
    HttpRequest = code(Facility::CoreHttp, 1),
    /// An incoming HTTP response.
    HttpResponse = code(Facility::CoreHttp, 2),
    /// An HTTP retry about to be made.
    HttpRetry = code(Facility::CoreHttp, 3),
    MqttReceivedTopic = code(Facility::IotMqtt, 1),
    MqttReceivedPayload = code(Facility::IotMqtt, 2),
    IotRetry = code(Facility::Iot, 1),
    IotSasToken = code(Facility::Iot, 2),
    IotAzureRtos = code(Facility::Iot, 3),
    HfsmEntry = code(Facility::Hfsm, 1),
    HfsmExit = code(Facility::Hfsm, 2),
}

impl Classification {
    /// Every known classification, in code order.
    pub const ALL: [Classification; 10] = [
        Classification::HttpRequest,
        Classification::HttpResponse,
        Classification::HttpRetry,
        Classification::MqttReceivedTopic,
        Classification::MqttReceivedPayload,
        Classification::IotRetry,
        Classification::IotSasToken,
        Classification::IotAzureRtos,
        Classification::HfsmEntry,
        Classification::HfsmExit,
    ];

    /// Stable integer code.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Look up a classification by its integer code.
    ///
    /// Returns `None` for unknown codes and for [`END_OF_LIST`].
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn facility(self) -> Facility {
        match self.code() >> 16 {
            1 => Facility::CoreHttp,
            2 => Facility::IotMqtt,
            3 => Facility::Iot,
            _ => Facility::Hfsm,
        }
    }

    /// Dotted name used in configuration (`http.request`, `iot.retry`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::HttpRequest => "http.request",
            Classification::HttpResponse => "http.response",
            Classification::HttpRetry => "http.retry",
            Classification::MqttReceivedTopic => "mqtt.received_topic",
            Classification::MqttReceivedPayload => "mqtt.received_payload",
            Classification::IotRetry => "iot.retry",
            Classification::IotSasToken => "iot.sas_token",
            Classification::IotAzureRtos => "iot.azure_rtos",
            Classification::HfsmEntry => "hfsm.entry",
            Classification::HfsmExit => "hfsm.exit",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification name or code that is not in the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log classification: {0}")]
pub struct UnknownClassification(pub String);

impl FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownClassification(wanted.to_string()))
    }
}

impl TryFrom<i32> for Classification {
    type Error = UnknownClassification;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| UnknownClassification(code.to_string()))
    }
}
