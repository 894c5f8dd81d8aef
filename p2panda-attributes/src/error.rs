// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use p2panda_attributes_core::{
    Address, AttributeError, AttributeId, AttributeRole, ContentError, DeletionStatusError,
    ForwardingError, Reference,
};
use p2panda_attributes_store::StoreError;
use thiserror::Error;

use crate::processors::ItemType;
use crate::tags::TagClientError;

/// Result of checks which do not mutate anything.
pub type ValidationResult = Result<(), AttributesError>;

/// Broad category of an error, for callers which only need to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An attribute which must exist is absent.
    NotFound,

    /// The change is not legal from the current state.
    InvalidTransition,

    /// An explicitly given id is taken already.
    Duplicate,

    /// Content or the requested mutation is not permitted.
    Forbidden,

    /// The sender is not the peer the attribute is shared with.
    Unauthorized,

    /// The tag service or the storage backend failed.
    UpstreamFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidTransition => "invalid transition",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::UpstreamFailure => "upstream failure",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Error)]
pub enum AttributesError {
    #[error("attribute {0} not found")]
    AttributeNotFound(AttributeId),

    #[error("predecessor {0} does not exist")]
    PredecessorDoesNotExist(AttributeId),

    #[error("successor {0} does not exist")]
    SuccessorDoesNotExist(AttributeId),

    #[error("attribute {0} was already succeeded")]
    CannotSucceedAttributesWithASuccessor(AttributeId),

    #[error("attribute {0} was deleted by its peer and can not be succeeded")]
    CannotSucceedSharedAttributesDeletedByPeer(AttributeId),

    #[error("successor must have the same owner as its predecessor")]
    SuccessionMustNotChangeOwner,

    #[error("successor must have the same value type as its predecessor")]
    SuccessionMustNotChangeValueType,

    #[error("successor must change the content or tags of its predecessor")]
    SuccessionMustChangeContent,

    #[error("successor {0} already exists")]
    SuccessorMustNotYetExist(AttributeId),

    #[error("attribute {0} already exists")]
    AttributeAlreadyExists(AttributeId),

    #[error("attribute {id} is a {actual} which is not expected here")]
    WrongTypeOfAttribute { id: AttributeId, actual: AttributeRole },

    #[error("content owned by {actual} where {expected} was expected")]
    WrongOwner { expected: Address, actual: Address },

    #[error(transparent)]
    DeletionStatus(#[from] DeletionStatusError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("attribute {id} was already forwarded to {peer}")]
    AlreadyForwarded { id: AttributeId, peer: Address },

    #[error("attribute {id} is not shared with {peer}")]
    AttributeNotSharedWithPeer { id: AttributeId, peer: Address },

    #[error("attribute {id} was already deleted by {peer}")]
    AttributeAlreadyDeletedByPeer { id: AttributeId, peer: Address },

    #[error("attribute {id} is confidential and can not be shared with {peer}")]
    ConfidentialAttribute { id: AttributeId, peer: Address },

    #[error("attribute {0} does not match the requested query")]
    AttributeQueryMismatch(AttributeId),

    #[error("default own identity attributes are not managed by this instance")]
    DefaultManagementDisabled,

    #[error("succeeded attribute {0} can not become a default")]
    CannotSetSucceededAttributeAsDefault(AttributeId),

    #[error("sender {sender} is not the peer of shared attribute {id}")]
    SenderIsNotPeerOfSharedAttribute { id: AttributeId, sender: Address },

    #[error("listener {0} already exists")]
    ListenerAlreadyExists(Reference),

    #[error("invalid form field response: {0}")]
    InvalidFormFieldResponse(String),

    #[error("no processor registered for {0}")]
    NoProcessorForItem(ItemType),

    #[error("processor for {expected} received a {actual}")]
    WrongItemType { expected: ItemType, actual: ItemType },

    #[error(transparent)]
    TagService(#[from] TagClientError),

    #[error(transparent)]
    Store(StoreError),
}

impl AttributesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttributesError::AttributeNotFound(_)
            | AttributesError::PredecessorDoesNotExist(_)
            | AttributesError::SuccessorDoesNotExist(_) => ErrorKind::NotFound,
            AttributesError::CannotSucceedAttributesWithASuccessor(_)
            | AttributesError::CannotSucceedSharedAttributesDeletedByPeer(_)
            | AttributesError::SuccessionMustNotChangeOwner
            | AttributesError::SuccessionMustNotChangeValueType
            | AttributesError::SuccessionMustChangeContent
            | AttributesError::WrongTypeOfAttribute { .. }
            | AttributesError::AlreadyForwarded { .. }
            | AttributesError::AttributeNotSharedWithPeer { .. }
            | AttributesError::AttributeAlreadyDeletedByPeer { .. }
            | AttributesError::AttributeQueryMismatch(_)
            | AttributesError::DefaultManagementDisabled
            | AttributesError::CannotSetSucceededAttributeAsDefault(_)
            | AttributesError::WrongItemType { .. } => ErrorKind::InvalidTransition,
            AttributesError::DeletionStatus(DeletionStatusError::NoDeletionStatusAllowed {
                ..
            }) => ErrorKind::Forbidden,
            AttributesError::DeletionStatus(_) => ErrorKind::InvalidTransition,
            AttributesError::SuccessorMustNotYetExist(_)
            | AttributesError::AttributeAlreadyExists(_)
            | AttributesError::ListenerAlreadyExists(_) => ErrorKind::Duplicate,
            AttributesError::WrongOwner { .. }
            | AttributesError::Content(_)
            | AttributesError::ConfidentialAttribute { .. }
            | AttributesError::InvalidFormFieldResponse(_)
            | AttributesError::NoProcessorForItem(_) => ErrorKind::Forbidden,
            AttributesError::SenderIsNotPeerOfSharedAttribute { .. } => ErrorKind::Unauthorized,
            AttributesError::TagService(_) => ErrorKind::UpstreamFailure,
            AttributesError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            AttributesError::Store(
                StoreError::AlreadyExists(_) | StoreError::ListenerAlreadyExists(_),
            ) => ErrorKind::Duplicate,
            AttributesError::Store(StoreError::Custom(_)) => ErrorKind::UpstreamFailure,
        }
    }

    /// Stable, machine-readable code of the error.
    pub fn code(&self) -> &'static str {
        match self {
            AttributesError::AttributeNotFound(_) => "error.attributes.recordNotFound",
            AttributesError::PredecessorDoesNotExist(_) => {
                "error.attributes.succession.predecessorDoesNotExist"
            }
            AttributesError::SuccessorDoesNotExist(_) => {
                "error.attributes.succession.successorDoesNotExist"
            }
            AttributesError::CannotSucceedAttributesWithASuccessor(_) => {
                "error.attributes.succession.cannotSucceedAttributesWithASuccessor"
            }
            AttributesError::CannotSucceedSharedAttributesDeletedByPeer(_) => {
                "error.attributes.succession.cannotSucceedSharedAttributesDeletedByPeer"
            }
            AttributesError::SuccessionMustNotChangeOwner => {
                "error.attributes.succession.successionMustNotChangeOwner"
            }
            AttributesError::SuccessionMustNotChangeValueType => {
                "error.attributes.succession.successionMustNotChangeValueType"
            }
            AttributesError::SuccessionMustChangeContent => {
                "error.attributes.succession.successionMustChangeContent"
            }
            AttributesError::SuccessorMustNotYetExist(_) => {
                "error.attributes.succession.successorMustNotYetExist"
            }
            AttributesError::AttributeAlreadyExists(_) => "error.attributes.attributeAlreadyExists",
            AttributesError::WrongTypeOfAttribute { .. } => "error.attributes.wrongTypeOfAttribute",
            AttributesError::WrongOwner { .. } => "error.attributes.wrongOwnerOfAttribute",
            AttributesError::DeletionStatus(_) => "error.attributes.invalidDeletionStatus",
            AttributesError::Content(ContentError::ForbiddenCharacters(_)) => {
                "error.attributes.forbiddenCharactersInAttribute"
            }
            AttributesError::Content(ContentError::InvalidTags(_)) => {
                "error.attributes.invalidTags"
            }
            AttributesError::AlreadyForwarded { .. } => "error.attributes.alreadyForwarded",
            AttributesError::AttributeNotSharedWithPeer { .. } => {
                "error.attributes.attributeNotSharedWithPeer"
            }
            AttributesError::AttributeAlreadyDeletedByPeer { .. } => {
                "error.attributes.attributeAlreadyDeletedByPeer"
            }
            AttributesError::ConfidentialAttribute { .. } => {
                "error.attributes.confidentialAttribute"
            }
            AttributesError::AttributeQueryMismatch(_) => "error.attributes.attributeQueryMismatch",
            AttributesError::DefaultManagementDisabled => {
                "error.attributes.setDefaultOwnIdentityAttributesIsDisabled"
            }
            AttributesError::CannotSetSucceededAttributeAsDefault(_) => {
                "error.attributes.cannotSetSucceededAttributeAsDefault"
            }
            AttributesError::SenderIsNotPeerOfSharedAttribute { .. } => {
                "error.attributes.senderIsNotPeerOfSharedAttribute"
            }
            AttributesError::ListenerAlreadyExists(_) => "error.attributes.listenerAlreadyExists",
            AttributesError::InvalidFormFieldResponse(_) => {
                "error.attributes.requestItems.formField.invalidResponse"
            }
            AttributesError::NoProcessorForItem(_) => "error.attributes.noProcessorForItem",
            AttributesError::WrongItemType { .. } => "error.attributes.wrongItemType",
            AttributesError::TagService(_) => "error.attributes.tagServiceFailure",
            AttributesError::Store(_) => "error.attributes.storeFailure",
        }
    }
}

impl AttributesError {
    /// Attaches the id of the affected attribute to a data model error.
    pub(crate) fn from_attribute_error(id: AttributeId, err: AttributeError) -> Self {
        match err {
            AttributeError::DeletionStatus(err) => AttributesError::DeletionStatus(err),
            AttributeError::Forwarding(ForwardingError::AlreadyForwarded(peer)) => {
                AttributesError::AlreadyForwarded { id, peer }
            }
            AttributeError::Forwarding(ForwardingError::NotForwarded(peer)) => {
                AttributesError::AttributeNotSharedWithPeer { id, peer }
            }
            AttributeError::ForwardingNotSupported(actual)
            | AttributeError::WrongContentKind(actual) => {
                AttributesError::WrongTypeOfAttribute { id, actual }
            }
        }
    }
}

impl From<StoreError> for AttributesError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => AttributesError::AttributeNotFound(id),
            StoreError::AlreadyExists(id) => AttributesError::AttributeAlreadyExists(id),
            StoreError::ListenerAlreadyExists(id) => AttributesError::ListenerAlreadyExists(id),
            other => AttributesError::Store(other),
        }
    }
}
