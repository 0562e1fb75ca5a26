use super::FrameFamily;

/// A single frame kind, as identified across all versions
#[derive(Debug)]
pub(crate) struct Row {
	pub(crate) v2: Option<&'static str>,
	pub(crate) v3: Option<&'static str>,
	pub(crate) v4: Option<&'static str>,
	pub(crate) family: FrameFamily,
}

macro_rules! id {
	(-) => {
		None
	};
	($id:literal) => {
		Some($id)
	};
}

macro_rules! gen_rows {
	($($family:ident => [$($v2:tt $v3:tt $v4:tt),+ $(,)?]);+ $(;)?) => {
		pub(crate) const ROWS: &[Row] = &[
			$(
				$(
					Row {
						v2: id!($v2),
						v3: id!($v3),
						v4: id!($v4),
						family: FrameFamily::$family,
					},
				)+
			)+
		];
	};
}

gen_rows!(
	Text => [
		"TAL" "TALB" "TALB",
		"TBP" "TBPM" "TBPM",
		"TCM" "TCOM" "TCOM",
		"TCO" "TCON" "TCON",
		"TCR" "TCOP" "TCOP",
		"TDA" "TDAT" -,
		"TDY" "TDLY" "TDLY",
		"TEN" "TENC" "TENC",
		"TFT" "TFLT" "TFLT",
		"TIM" "TIME" -,
		"TKE" "TKEY" "TKEY",
		"TLA" "TLAN" "TLAN",
		"TLE" "TLEN" "TLEN",
		"TMT" "TMED" "TMED",
		"TOA" "TOPE" "TOPE",
		"TOF" "TOFN" "TOFN",
		"TOL" "TOLY" "TOLY",
		"TOR" "TORY" "TDOR",
		"TOT" "TOAL" "TOAL",
		"TP1" "TPE1" "TPE1",
		"TP2" "TPE2" "TPE2",
		"TP3" "TPE3" "TPE3",
		"TP4" "TPE4" "TPE4",
		"TPA" "TPOS" "TPOS",
		"TPB" "TPUB" "TPUB",
		"TRC" "TSRC" "TSRC",
		"TRD" "TRDA" -,
		"TRK" "TRCK" "TRCK",
		"TSI" "TSIZ" -,
		"TSS" "TSSE" "TSSE",
		"TT1" "TIT1" "TIT1",
		"TT2" "TIT2" "TIT2",
		"TT3" "TIT3" "TIT3",
		"TXT" "TEXT" "TEXT",
		"TXX" "TXXX" "TXXX",
		"TYE" "TYER" "TDRC",
		"IPL" "IPLS" "TIPL",
		- "TOWN" "TOWN",
		- "TRSN" "TRSN",
		- "TRSO" "TRSO",
		- - "TDEN",
		- - "TDTG",
		- - "TMCL",
		- - "TMOO",
		- - "TPRO",
		- - "TSST",
		// iTunes
		"TCP" "TCMP" "TCMP",
		"TS2" "TSO2" "TSO2",
		"TSA" "TSOA" "TSOA",
		"TSC" "TSOC" "TSOC",
		"TSP" "TSOP" "TSOP",
		"TST" "TSOT" "TSOT",
		"TCT" "TCAT" "TCAT",
		"TDS" "TDES" "TDES",
		"TID" "TGID" "TGID",
		"TDR" "TDRL" "TDRL",
		- "TKWD" "TKWD",
	];
	Url => [
		"WAF" "WOAF" "WOAF",
		"WAR" "WOAR" "WOAR",
		"WAS" "WOAS" "WOAS",
		"WCM" "WCOM" "WCOM",
		"WCP" "WCOP" "WCOP",
		"WPB" "WPUB" "WPUB",
		"WXX" "WXXX" "WXXX",
		- "WORS" "WORS",
		- "WPAY" "WPAY",
		// iTunes
		"WFD" "WFED" "WFED",
	];
	Other => [
		"BUF" "RBUF" "RBUF",
		"CNT" "PCNT" "PCNT",
		"COM" "COMM" "COMM",
		"CRA" "AENC" "AENC",
		"CRM" - -,
		"ETC" "ETCO" "ETCO",
		"EQU" "EQUA" -,
		"GEO" "GEOB" "GEOB",
		"LNK" "LINK" "LINK",
		"MCI" "MCDI" "MCDI",
		"MLL" "MLLT" "MLLT",
		"PIC" "APIC" "APIC",
		"POP" "POPM" "POPM",
		"REV" "RVRB" "RVRB",
		"RVA" "RVAD" -,
		"SLT" "SYLT" "SYLT",
		"STC" "SYTC" "SYTC",
		"UFI" "UFID" "UFID",
		"ULT" "USLT" "USLT",
		- "COMR" "COMR",
		- "ENCR" "ENCR",
		- "GRID" "GRID",
		- "OWNE" "OWNE",
		- "POSS" "POSS",
		- "PRIV" "PRIV",
		- "USER" "USER",
		- - "ASPI",
		- - "EQU2",
		- - "RVA2",
		- - "SEEK",
		- - "SIGN",
		- "CHAP" "CHAP",
		- "CTOC" "CTOC",
		// iTunes
		"PCS" "PCST" "PCST",
		"MVI" "MVIN" "MVIN",
		"MVN" "MVNM" "MVNM",
		"GP1" "GRP1" "GRP1",
	];
);
