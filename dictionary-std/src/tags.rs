//! Data element tag declarations
//!
//! Curated subset of the standard DICOM data element dictionary (PS3.6),
//! covering the attributes referenced elsewhere in this workspace
//! (DIMSE command fields, pixel data description, identifying attributes)
//! plus a handful of commonly used attributes.

use dicom_core::dictionary::{DataDictionaryEntryRef, TagRange::*, VirtualVr::*};
use dicom_core::Tag;
use dicom_core::VR::*;

// -- identification --

#[rustfmt::skip]
pub const SPECIFIC_CHARACTER_SET: Tag = Tag(0x0008, 0x0005);
#[rustfmt::skip]
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
#[rustfmt::skip]
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
#[rustfmt::skip]
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
#[rustfmt::skip]
pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
#[rustfmt::skip]
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
#[rustfmt::skip]
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
#[rustfmt::skip]
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
#[rustfmt::skip]
pub const REFERRING_PHYSICIAN_NAME: Tag = Tag(0x0008, 0x0090);
#[rustfmt::skip]
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
#[rustfmt::skip]
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);

#[rustfmt::skip]
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
#[rustfmt::skip]
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
#[rustfmt::skip]
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
#[rustfmt::skip]
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);

#[rustfmt::skip]
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
#[rustfmt::skip]
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
#[rustfmt::skip]
pub const STUDY_ID: Tag = Tag(0x0020, 0x0010);
#[rustfmt::skip]
pub const SERIES_NUMBER: Tag = Tag(0x0020, 0x0011);
#[rustfmt::skip]
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// -- pixel description --

#[rustfmt::skip]
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
#[rustfmt::skip]
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
#[rustfmt::skip]
pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
#[rustfmt::skip]
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
#[rustfmt::skip]
pub const ROWS: Tag = Tag(0x0028, 0x0010);
#[rustfmt::skip]
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
#[rustfmt::skip]
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
#[rustfmt::skip]
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
#[rustfmt::skip]
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
#[rustfmt::skip]
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
#[rustfmt::skip]
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
#[rustfmt::skip]
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
#[rustfmt::skip]
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
#[rustfmt::skip]
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);

#[rustfmt::skip]
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// -- DIMSE command fields (PS3.7 Annex E) --

#[rustfmt::skip]
pub const COMMAND_GROUP_LENGTH: Tag = Tag(0x0000, 0x0000);
#[rustfmt::skip]
pub const AFFECTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0002);
#[rustfmt::skip]
pub const AFFECTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1000);
#[rustfmt::skip]
pub const REQUESTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0003);
#[rustfmt::skip]
pub const REQUESTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1001);
#[rustfmt::skip]
pub const COMMAND_FIELD: Tag = Tag(0x0000, 0x0100);
#[rustfmt::skip]
pub const MESSAGE_ID: Tag = Tag(0x0000, 0x0110);
#[rustfmt::skip]
pub const MESSAGE_ID_BEING_RESPONDED_TO: Tag = Tag(0x0000, 0x0120);
#[rustfmt::skip]
pub const MOVE_DESTINATION: Tag = Tag(0x0000, 0x0600);
#[rustfmt::skip]
pub const PRIORITY: Tag = Tag(0x0000, 0x0700);
#[rustfmt::skip]
pub const COMMAND_DATA_SET_TYPE: Tag = Tag(0x0000, 0x0800);
#[rustfmt::skip]
pub const STATUS: Tag = Tag(0x0000, 0x0900);
#[rustfmt::skip]
pub const OFFENDING_ELEMENT: Tag = Tag(0x0000, 0x0901);
#[rustfmt::skip]
pub const ERROR_COMMENT: Tag = Tag(0x0000, 0x0902);
#[rustfmt::skip]
pub const ERROR_ID: Tag = Tag(0x0000, 0x0903);
#[rustfmt::skip]
pub const AFFECTED_SOP_INSTANCE_UID_LIST: Tag = Tag(0x0000, 0x1002);
#[rustfmt::skip]
pub const MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0000, 0x1030);
#[rustfmt::skip]
pub const MOVE_ORIGINATOR_MESSAGE_ID: Tag = Tag(0x0000, 0x1031);
#[rustfmt::skip]
pub const NUMBER_OF_REMAINING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1020);
#[rustfmt::skip]
pub const NUMBER_OF_COMPLETED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1021);
#[rustfmt::skip]
pub const NUMBER_OF_FAILED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1022);
#[rustfmt::skip]
pub const NUMBER_OF_WARNING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1023);

type E = DataDictionaryEntryRef<'static>;

#[rustfmt::skip]
pub(crate) const ENTRIES: &[E] = &[
    E { tag: Single(SPECIFIC_CHARACTER_SET), alias: "SpecificCharacterSet", vr: Exact(CS) },
    E { tag: Single(IMAGE_TYPE), alias: "ImageType", vr: Exact(CS) },
    E { tag: Single(SOP_CLASS_UID), alias: "SOPClassUID", vr: Exact(UI) },
    E { tag: Single(SOP_INSTANCE_UID), alias: "SOPInstanceUID", vr: Exact(UI) },
    E { tag: Single(STUDY_DATE), alias: "StudyDate", vr: Exact(DA) },
    E { tag: Single(STUDY_TIME), alias: "StudyTime", vr: Exact(TM) },
    E { tag: Single(ACCESSION_NUMBER), alias: "AccessionNumber", vr: Exact(SH) },
    E { tag: Single(MODALITY), alias: "Modality", vr: Exact(CS) },
    E { tag: Single(MANUFACTURER), alias: "Manufacturer", vr: Exact(LO) },
    E { tag: Single(REFERRING_PHYSICIAN_NAME), alias: "ReferringPhysicianName", vr: Exact(PN) },
    E { tag: Single(SERIES_DESCRIPTION), alias: "SeriesDescription", vr: Exact(LO) },
    E { tag: Single(PATIENT_NAME), alias: "PatientName", vr: Exact(PN) },
    E { tag: Single(PATIENT_ID), alias: "PatientID", vr: Exact(LO) },
    E { tag: Single(PATIENT_BIRTH_DATE), alias: "PatientBirthDate", vr: Exact(DA) },
    E { tag: Single(PATIENT_SEX), alias: "PatientSex", vr: Exact(CS) },
    E { tag: Single(STUDY_INSTANCE_UID), alias: "StudyInstanceUID", vr: Exact(UI) },
    E { tag: Single(SERIES_INSTANCE_UID), alias: "SeriesInstanceUID", vr: Exact(UI) },
    E { tag: Single(STUDY_ID), alias: "StudyID", vr: Exact(SH) },
    E { tag: Single(SERIES_NUMBER), alias: "SeriesNumber", vr: Exact(IS) },
    E { tag: Single(INSTANCE_NUMBER), alias: "InstanceNumber", vr: Exact(IS) },
    E { tag: Single(SAMPLES_PER_PIXEL), alias: "SamplesPerPixel", vr: Exact(US) },
    E { tag: Single(PHOTOMETRIC_INTERPRETATION), alias: "PhotometricInterpretation", vr: Exact(CS) },
    E { tag: Single(PLANAR_CONFIGURATION), alias: "PlanarConfiguration", vr: Exact(US) },
    E { tag: Single(NUMBER_OF_FRAMES), alias: "NumberOfFrames", vr: Exact(IS) },
    E { tag: Single(ROWS), alias: "Rows", vr: Exact(US) },
    E { tag: Single(COLUMNS), alias: "Columns", vr: Exact(US) },
    E { tag: Single(BITS_ALLOCATED), alias: "BitsAllocated", vr: Exact(US) },
    E { tag: Single(BITS_STORED), alias: "BitsStored", vr: Exact(US) },
    E { tag: Single(HIGH_BIT), alias: "HighBit", vr: Exact(US) },
    E { tag: Single(PIXEL_REPRESENTATION), alias: "PixelRepresentation", vr: Exact(US) },
    E { tag: Single(WINDOW_CENTER), alias: "WindowCenter", vr: Exact(DS) },
    E { tag: Single(WINDOW_WIDTH), alias: "WindowWidth", vr: Exact(DS) },
    E { tag: Single(RESCALE_INTERCEPT), alias: "RescaleIntercept", vr: Exact(DS) },
    E { tag: Single(RESCALE_SLOPE), alias: "RescaleSlope", vr: Exact(DS) },
    E { tag: Single(PIXEL_DATA), alias: "PixelData", vr: Px },
    E { tag: Single(COMMAND_GROUP_LENGTH), alias: "CommandGroupLength", vr: Exact(UL) },
    E { tag: Single(AFFECTED_SOP_CLASS_UID), alias: "AffectedSOPClassUID", vr: Exact(UI) },
    E { tag: Single(AFFECTED_SOP_INSTANCE_UID), alias: "AffectedSOPInstanceUID", vr: Exact(UI) },
    E { tag: Single(REQUESTED_SOP_CLASS_UID), alias: "RequestedSOPClassUID", vr: Exact(UI) },
    E { tag: Single(REQUESTED_SOP_INSTANCE_UID), alias: "RequestedSOPInstanceUID", vr: Exact(UI) },
    E { tag: Single(COMMAND_FIELD), alias: "CommandField", vr: Exact(US) },
    E { tag: Single(MESSAGE_ID), alias: "MessageID", vr: Exact(US) },
    E { tag: Single(MESSAGE_ID_BEING_RESPONDED_TO), alias: "MessageIDBeingRespondedTo", vr: Exact(US) },
    E { tag: Single(MOVE_DESTINATION), alias: "MoveDestination", vr: Exact(AE) },
    E { tag: Single(PRIORITY), alias: "Priority", vr: Exact(US) },
    E { tag: Single(COMMAND_DATA_SET_TYPE), alias: "CommandDataSetType", vr: Exact(US) },
    E { tag: Single(STATUS), alias: "Status", vr: Exact(US) },
    E { tag: Single(OFFENDING_ELEMENT), alias: "OffendingElement", vr: Exact(AT) },
    E { tag: Single(ERROR_COMMENT), alias: "ErrorComment", vr: Exact(LO) },
    E { tag: Single(ERROR_ID), alias: "ErrorID", vr: Exact(US) },
    E { tag: Single(AFFECTED_SOP_INSTANCE_UID_LIST), alias: "AffectedSOPInstanceUIDList", vr: Exact(UI) },
    E { tag: Single(MOVE_ORIGINATOR_APPLICATION_ENTITY_TITLE), alias: "MoveOriginatorApplicationEntityTitle", vr: Exact(AE) },
    E { tag: Single(MOVE_ORIGINATOR_MESSAGE_ID), alias: "MoveOriginatorMessageID", vr: Exact(US) },
    E { tag: Single(NUMBER_OF_REMAINING_SUBOPERATIONS), alias: "NumberOfRemainingSuboperations", vr: Exact(US) },
    E { tag: Single(NUMBER_OF_COMPLETED_SUBOPERATIONS), alias: "NumberOfCompletedSuboperations", vr: Exact(US) },
    E { tag: Single(NUMBER_OF_FAILED_SUBOPERATIONS), alias: "NumberOfFailedSuboperations", vr: Exact(US) },
    E { tag: Single(NUMBER_OF_WARNING_SUBOPERATIONS), alias: "NumberOfWarningSuboperations", vr: Exact(US) },
];
