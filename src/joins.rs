//! Named join clauses for the registry tables.
//!
//! Each entry is a literal `INNER JOIN ...` chain from a base table to the
//! detail tables it references by foreign key. Pass one to
//! `Select::join` (or `TableGateway::select_with_join`) instead of writing
//! the chain at every call site.

use crate::core::GatewayError;
use std::fmt;
use std::str::FromStr;

const PF_PESSOAL_CONTATO_IDENTIFICACAO: &str = "INNER JOIN registro_pf_info_pessoal ON registro_pf_info_pessoal.id_pf_dados = registro_pf.info_pessoal \
INNER JOIN registro_pf_contato ON registro_pf_contato.id_pf_contato = registro_pf.contato \
INNER JOIN registro_pf_identificacao ON registro_pf_identificacao.id_pf_identificacao = registro_pf.identificacao";

/// A join chain from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogJoin {
    /// `solicitacao` with its petitioner and petitioner address
    SolicitacaoManifestante,
    /// `registro_pf` with personal, contact, identification, CAM, voter and education details
    RegistroPfFormacao,
    /// `registro_pf` with the second-copy card request
    RegistroPfSegundaVia,
    /// `registro_pf` with the registration transfer and education details
    RegistroPfTransferencia,
    /// `registro_pf` with the registration cancellation
    RegistroPfBaixa,
    /// `registro_pf` with contact details and the linked legal entity
    RegistroPfPj,
    /// `registro_pf` with personal, contact and identification details only
    RegistroPfEstagiario,
    /// `registro_pf` with contact details and the practice
    RegistroPfConsultorio,
    /// `registro_pf` with contact details, the practice and its address
    RegistroPfConsultorioEndereco,
}

impl CatalogJoin {
    pub const ALL: [CatalogJoin; 9] = [
        CatalogJoin::SolicitacaoManifestante,
        CatalogJoin::RegistroPfFormacao,
        CatalogJoin::RegistroPfSegundaVia,
        CatalogJoin::RegistroPfTransferencia,
        CatalogJoin::RegistroPfBaixa,
        CatalogJoin::RegistroPfPj,
        CatalogJoin::RegistroPfEstagiario,
        CatalogJoin::RegistroPfConsultorio,
        CatalogJoin::RegistroPfConsultorioEndereco,
    ];

    /// Stable name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            CatalogJoin::SolicitacaoManifestante => "solicitacao-manifestante",
            CatalogJoin::RegistroPfFormacao => "pf-formacao",
            CatalogJoin::RegistroPfSegundaVia => "pf-segunda-via",
            CatalogJoin::RegistroPfTransferencia => "pf-transferencia",
            CatalogJoin::RegistroPfBaixa => "pf-baixa",
            CatalogJoin::RegistroPfPj => "pf-pj",
            CatalogJoin::RegistroPfEstagiario => "pf-estagiario",
            CatalogJoin::RegistroPfConsultorio => "pf-consultorio",
            CatalogJoin::RegistroPfConsultorioEndereco => "pf-consultorio-endereco",
        }
    }

    /// The table the chain's `ON` conditions expect in the `FROM` position.
    pub fn base_table(self) -> &'static str {
        match self {
            CatalogJoin::SolicitacaoManifestante => "solicitacao",
            _ => "registro_pf",
        }
    }

    /// The literal join clause.
    pub fn sql(self) -> String {
        match self {
            CatalogJoin::SolicitacaoManifestante => "INNER JOIN manifestante ON manifestante.id_manifestante = solicitacao.manifestante \
INNER JOIN endereco_manifestante ON endereco_manifestante.id_endereco = solicitacao.endereco"
                .to_string(),
            CatalogJoin::RegistroPfFormacao => format!(
                "{} INNER JOIN registro_pf_cam ON registro_pf_cam.id_pf_cam = registro_pf.cam \
INNER JOIN registro_pf_eleitor ON registro_pf_eleitor.id_pf_eleitor = registro_pf.titulo_eleitor \
INNER JOIN registro_pf_formacao ON registro_pf_formacao.id_pf_formacao = registro_pf.formacao",
                PF_PESSOAL_CONTATO_IDENTIFICACAO
            ),
            CatalogJoin::RegistroPfSegundaVia => format!(
                "{} INNER JOIN segunda_via_cedula ON segunda_via_cedula.id_cedula = registro_pf.segunda_via \
INNER JOIN registro_pf_eleitor ON registro_pf_eleitor.id_pf_eleitor = registro_pf.titulo_eleitor",
                PF_PESSOAL_CONTATO_IDENTIFICACAO
            ),
            CatalogJoin::RegistroPfTransferencia => format!(
                "{} INNER JOIN transferencia_registro ON transferencia_registro.id_transferencia = registro_pf.transferencia \
INNER JOIN registro_pf_eleitor ON registro_pf_eleitor.id_pf_eleitor = registro_pf.titulo_eleitor \
INNER JOIN registro_pf_formacao ON registro_pf_formacao.id_pf_formacao = registro_pf.formacao",
                PF_PESSOAL_CONTATO_IDENTIFICACAO
            ),
            CatalogJoin::RegistroPfBaixa => format!(
                "{} INNER JOIN baixa_registro_pf ON baixa_registro_pf.id_baixa_registro = registro_pf.baixa",
                PF_PESSOAL_CONTATO_IDENTIFICACAO
            ),
            CatalogJoin::RegistroPfPj => "INNER JOIN registro_pf_contato ON registro_pf_contato.id_pf_contato = registro_pf.contato \
INNER JOIN registro_pj ON registro_pj.id_registro_pj = registro_pf.id_pj"
                .to_string(),
            CatalogJoin::RegistroPfEstagiario => PF_PESSOAL_CONTATO_IDENTIFICACAO.to_string(),
            CatalogJoin::RegistroPfConsultorio => "INNER JOIN registro_pf_contato ON registro_pf_contato.id_pf_contato = registro_pf.contato \
INNER JOIN registro_consultorio ON registro_consultorio.id_consultorio = registro_pf.consultorio"
                .to_string(),
            CatalogJoin::RegistroPfConsultorioEndereco => format!(
                "{} INNER JOIN end_consultorio ON end_consultorio.id_end_consultorio = registro_pf.end_consultorio",
                CatalogJoin::RegistroPfConsultorio.sql()
            ),
        }
    }
}

impl fmt::Display for CatalogJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CatalogJoin {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogJoin::ALL
            .iter()
            .copied()
            .find(|join| join.name() == s)
            .ok_or_else(|| GatewayError::Config(format!("unknown join '{}'", s)))
    }
}
